use market::Ticker;

/// Prints the catalog, one ticker per line.
pub fn list_tickers() {
    println!("{:<16} {:<16} {}", "LABEL", "SYMBOL", "TITLE");
    for ticker in Ticker::ALL {
        println!("{:<16} {:<16} {}", ticker.label(), ticker.symbol(), ticker.title());
    }
}
