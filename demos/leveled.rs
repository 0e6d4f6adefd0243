use simplelog::{FormatOptions, Logger, Severity};

fn main() {
    let logger = Logger::new(
        std::io::stdout(),
        "[example] ",
        FormatOptions::STD | FormatOptions::SHORT_FILE,
        0,
    );
    logger.set_level(Severity::INFO);

    simplelog::debug!(logger, "this", " won't", " be", " logged");
    simplelog::info!(logger, "this", " will", " be", " logged");
    simplelog::errorf!(logger, "this {} be logged", "will");

    // threads share the logger without interleaving lines
    std::thread::scope(|s| {
        for i in 0..4 {
            let logger = &logger;
            s.spawn(move || simplelog::info!(logger, "hello from thread ", i));
        }
    });
}
