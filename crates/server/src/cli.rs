use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "salabot")]
#[command(about = "Sala do Futuro login automation with live progress streaming")]
#[command(version)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Override the portal login URL
    #[arg(long, value_name = "URL")]
    pub login_url: Option<String>,

    /// Run the browser with a visible window instead of headless
    #[arg(long)]
    pub headed: bool,
}
