use licitaciones_cli::{cli, errors};

fn main() -> errors::AppResult<()> {
    let rt =
        tokio::runtime::Runtime::new().map_err(|e| errors::AppError::IoError(e.to_string()))?;

    rt.block_on(cli::cli())
}
