use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "notes-server", about = "Notes front server")]
pub struct Opt {
    /// Config file path
    #[arg(short, long, value_parser, default_value = "config.toml")]
    pub config: clio::Input,

    /// Notes API base URL, overrides the one from the config file
    #[arg(long, env = "NOTES_API_URL")]
    pub api_url: Option<String>,
}
