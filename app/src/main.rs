fn run_app(
    run_tui: impl FnOnce() -> Result<(), scry_tui::TuiError>,
) -> Result<(), Box<dyn std::error::Error>> {
    let _ = scry_core::domain_name();
    let _ = scry_adapters::adapter_name();
    run_tui()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    run_app(scry_tui::run)
}
