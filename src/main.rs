use clap::{App, AppSettings, Arg};

use divvyTaxHelper::{
    default_reference_list, get_usd_per_eur_rate, init_logging_infrastructure,
    load_reference_list, render_entries, render_espp_summary, render_summary, run_report,
    save_backup, ResultExt,
};

fn create_cmd_line_pattern<'a, 'b>(myapp: App<'a, 'b>) -> App<'a, 'b> {
    myapp
        .arg(
            Arg::with_name("rate")
                .long("rate")
                .help("USD to EUR conversion rate e.g. 1.08 (taken from the ECB when omitted)")
                .value_name("RATE")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("price")
                .long("price")
                .help("Current share price in USD for the ESPP report")
                .value_name("PRICE")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("countries")
                .long("countries")
                .help("JSON file replacing the built-in country reference list")
                .value_name("FILE")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("save")
                .long("save")
                .help("Write the merged dividend entries back out as a backup (json or csv)")
                .value_name("FILE")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("backup files")
                .help("Dividend backup files (json, csv) and at most one ESPP xlsx spreadsheet")
                .multiple(true)
                .required(true),
        )
}

fn main() {
    init_logging_infrastructure();

    let myapp = App::new("Dividend tax helper").setting(AppSettings::ArgRequiredElseHelp);
    let matches = create_cmd_line_pattern(myapp).get_matches_from(wild::args());

    log::info!("Started divvyTaxHelper");

    let reference_list = match matches.value_of("countries") {
        Some(path) => {
            load_reference_list(path).expect_and_log("Error: unable to load countries file")
        }
        None => default_reference_list(),
    };

    let conversion_rate: f64 = match matches.value_of("rate") {
        Some(rate) => rate
            .parse()
            .expect_and_log("Error: unable to parse conversion rate"),
        None => {
            let today = chrono::Local::now().date_naive();
            let (date, rate) = get_usd_per_eur_rate(today).expect_and_log(
                "Error: unable to get USD/EUR rate from ECB. Please check your internet connection or proxy settings, or pass --rate",
            );
            println!("Using ECB USD/EUR reference rate {rate} of {date}");
            rate
        }
    };

    let latest_price: Option<f64> = matches.value_of("price").map(|price| {
        price
            .parse()
            .expect_and_log("Error: unable to parse share price")
    });

    let names: Vec<String> = matches
        .values_of("backup files")
        .expect_and_log("error getting backup file names")
        .map(String::from)
        .collect();

    let result = run_report(&names, conversion_rate, latest_price, &reference_list)
        .expect_and_log("Error: unable to produce tax report");

    result.ledger.entries().iter().for_each(|entry| {
        log::info!("{}", entry.format_to_print(""));
    });

    println!("{}", render_entries(result.ledger.entries()));
    println!();
    println!("{}", render_summary(&result.summary));
    if let Some(espp_summary) = &result.espp_summary {
        println!();
        println!("{}", render_espp_summary(espp_summary));
    }

    if let Some(save_path) = matches.value_of("save") {
        save_backup(save_path, result.ledger.entries())
            .expect_and_log("Error: unable to save backup");
        println!("Saved {} entries to {}", result.ledger.len(), save_path);
    }
}
