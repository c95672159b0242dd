use clap::Parser;

use crag_batch::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	crag_batch::run(args).await
}
