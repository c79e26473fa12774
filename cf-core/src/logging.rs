use tracing_subscriber::fmt::format::FmtSpan;

// Command output (state YAML, schemas) goes to stdout, so logs always go to stderr to keep piped
// output clean.  The "verbose" flavour adds source locations and span creation events, which is
// mostly useful when debugging wait loops.
pub fn setup_for_cli(env_filter: &str, verbose: bool) {
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    if verbose {
        builder
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::NEW)
            .compact()
            .init();
    } else {
        builder.without_time().compact().init();
    }
}
