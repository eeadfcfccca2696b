use anyhow::Result;

fn main() -> Result<()> {
    loggen_cli::cli::execute()
}
