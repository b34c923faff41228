//! CLI commands and handlers
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use crate::domain::pool::{SortDirection, SortKey};
use crate::shared::config::{AppCfg, CfgOverrides};
use crate::shared::errors::AppError;
use super::pool_detail::DetailState;
use super::report::{render_detail, render_list};
use super::services::DashboardService;

#[derive(Parser)]
#[command(name = "yieldscope")]
#[command(version, about = "DeFi yield pool dashboard for the terminal")]
pub struct Cli {
    /// Path to config file (optional)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Pools endpoint (overrides config)
    #[arg(long, global = true)]
    pub pools_url: Option<String>,

    /// Protocol endpoint base (overrides config)
    #[arg(long, global = true)]
    pub protocol_url: Option<String>,

    /// Pool history endpoint base (overrides config)
    #[arg(long, global = true)]
    pub history_url: Option<String>,

    /// HTTP timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Decimal places for percentages (overrides config)
    #[arg(long, global = true)]
    pub decimals: Option<usize>,

    /// Log filter, e.g. "info" or "yieldscope=debug"
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> CfgOverrides {
        CfgOverrides {
            pools_url: self.pools_url.clone(),
            protocol_url: self.protocol_url.clone(),
            history_url: self.history_url.clone(),
            timeout_secs: self.timeout_secs,
            decimals: self.decimals,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show one page of the pool table
    Pools {
        #[command(flatten)]
        list: ListArgs,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the detail view of one pool
    Pool {
        /// Pool id
        id: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Interactive session: filter, sort, page and open pools
    Browse,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Project substring filter
    #[arg(long, default_value = "")]
    pub project: String,

    /// Chain substring filter
    #[arg(long, default_value = "")]
    pub chain: String,

    /// Token symbol substring filter
    #[arg(long, default_value = "")]
    pub token: String,

    /// Sort column: symbol, project, chain, apy, mu, sigma (descending unless --asc)
    #[arg(long)]
    pub sort: Option<SortKey>,

    /// Sort ascending
    #[arg(long)]
    pub asc: bool,

    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

/// One line of input in the interactive session
#[derive(Debug, Clone, PartialEq)]
pub enum BrowseCommand {
    Project(String),
    Chain(String),
    Token(String),
    Sort(SortKey),
    Page(usize),
    Next,
    Prev,
    /// 1-based row number on the current page
    Open(usize),
    Back,
    Refresh,
    Help,
    Quit,
}

impl FromStr for BrowseCommand {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let number = |what: &str| {
            rest.parse::<usize>()
                .map_err(|_| AppError::InvalidCommand(format!("{} expects a number, got '{}'", what, rest)))
        };

        match word.to_lowercase().as_str() {
            "project" => Ok(BrowseCommand::Project(rest.to_string())),
            "chain" => Ok(BrowseCommand::Chain(rest.to_string())),
            "token" => Ok(BrowseCommand::Token(rest.to_string())),
            "sort" => rest.parse().map(BrowseCommand::Sort).map_err(AppError::InvalidCommand),
            "page" => Ok(BrowseCommand::Page(number("page")?)),
            "next" | "n" => Ok(BrowseCommand::Next),
            "prev" | "p" => Ok(BrowseCommand::Prev),
            "open" | "o" => Ok(BrowseCommand::Open(number("open")?)),
            "back" | "b" => Ok(BrowseCommand::Back),
            "refresh" | "r" => Ok(BrowseCommand::Refresh),
            "help" | "h" | "?" => Ok(BrowseCommand::Help),
            "quit" | "q" | "exit" => Ok(BrowseCommand::Quit),
            other => Err(AppError::InvalidCommand(format!("unknown command '{}', try 'help'", other))),
        }
    }
}

const BROWSE_HELP: &str = "\
Commands:
  project <text>   filter by project (empty clears)
  chain <text>     filter by chain (empty clears)
  token <text>     filter by token symbol (empty clears)
  sort <key>       sort by symbol|project|chain|apy|mu|sigma (again to flip)
  page <n> | next | prev
  open <row#>      show detail of a row on this page
  back             return to the table
  refresh          refetch the pool list
  quit
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    List,
    Detail,
}

/// Interactive list/detail navigation over a dashboard
pub struct BrowseSession {
    dashboard: DashboardService,
    screen: Screen,
}

impl BrowseSession {
    pub fn new(dashboard: DashboardService) -> Self {
        Self { dashboard, screen: Screen::List }
    }

    pub async fn start(&mut self) -> String {
        self.dashboard.list.load().await;
        render_list(&self.dashboard.list.state().await)
    }

    /// Apply one command; `None` ends the session
    pub async fn handle(&mut self, command: BrowseCommand) -> Result<Option<String>, AppError> {
        let list = &mut self.dashboard.list;
        match command {
            BrowseCommand::Quit => return Ok(None),
            BrowseCommand::Help => return Ok(Some(BROWSE_HELP.to_string())),
            BrowseCommand::Project(text) => list.set_project_filter(&text),
            BrowseCommand::Chain(text) => list.set_chain_filter(&text),
            BrowseCommand::Token(text) => list.set_token_filter(&text),
            BrowseCommand::Sort(key) => list.toggle_sort(key),
            BrowseCommand::Page(page) => list.set_page(page),
            BrowseCommand::Next => list.next_page().await,
            BrowseCommand::Prev => list.prev_page(),
            BrowseCommand::Back => {}
            BrowseCommand::Refresh => {
                list.load().await;
                if self.screen == Screen::Detail {
                    return Ok(Some(render_detail(&self.dashboard.detail.resolve_settled().await)));
                }
            }
            BrowseCommand::Open(row) => {
                let selected = match row.checked_sub(1) {
                    Some(index) => list.select_row(index).await,
                    None => None,
                };
                if selected.is_none() {
                    return Err(AppError::InvalidCommand(format!("no row {} on this page", row)));
                }
                self.screen = Screen::Detail;
                return Ok(Some(render_detail(&self.dashboard.detail.resolve_settled().await)));
            }
        }

        self.screen = Screen::List;
        Ok(Some(render_list(&self.dashboard.list.state().await)))
    }
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(command: Commands, cfg: AppCfg) -> Result<()> {
        let dashboard = DashboardService::from_config(&cfg)?;
        match command {
            Commands::Pools { list, json } => Self::execute_pools_command(dashboard, list, json).await,
            Commands::Pool { id, json } => Self::execute_pool_command(dashboard, id, json).await,
            Commands::Browse => Self::execute_browse_command(dashboard).await,
        }
    }

    /// Execute pools command
    async fn execute_pools_command(mut dashboard: DashboardService, args: ListArgs, json: bool) -> Result<()> {
        let list = &mut dashboard.list;
        list.load().await;
        list.set_project_filter(&args.project);
        list.set_chain_filter(&args.chain);
        list.set_token_filter(&args.token);
        if let Some(key) = args.sort {
            let direction = if args.asc { SortDirection::Ascending } else { SortDirection::Descending };
            list.set_sort(key, direction);
        }
        list.set_page(args.page);

        let state = list.state().await;
        if json {
            println!("{}", serde_json::to_string_pretty(&state)?);
        } else {
            print!("{}", render_list(&state));
        }
        Ok(())
    }

    /// Execute pool detail command
    async fn execute_pool_command(dashboard: DashboardService, id: String, json: bool) -> Result<()> {
        dashboard.list.load().await;
        dashboard.list.select_pool(&id).await;

        let state = dashboard.detail.resolve_settled().await;
        if json {
            println!("{}", serde_json::to_string_pretty(&state)?);
        } else {
            print!("{}", render_detail(&state));
        }

        if let DetailState::NotFound { pool_id } = state {
            return Err(AppError::PoolNotFound(pool_id).into());
        }
        Ok(())
    }

    /// Execute browse command
    async fn execute_browse_command(dashboard: DashboardService) -> Result<()> {
        info!("🚀 Starting interactive session");
        let mut session = BrowseSession::new(dashboard);
        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        stdout.write_all(session.start().await.as_bytes()).await?;
        loop {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let output = match line.parse::<BrowseCommand>() {
                Ok(command) => session.handle(command).await,
                Err(e) => Err(e),
            };
            match output {
                Ok(Some(text)) => stdout.write_all(text.as_bytes()).await?,
                Ok(None) => break,
                Err(e) => {
                    warn!("{}", e);
                    stdout.write_all(format!("{}\n", e).as_bytes()).await?;
                }
            }
        }

        info!("✅ Session closed");
        Ok(())
    }
}
