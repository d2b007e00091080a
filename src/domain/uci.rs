//! UCI (Universal Chess Interface) protocol types.
//!
//! Typed outbound commands and categorized inbound lines. Spawning the engine
//! and moving lines around is the transport's job (see `models::transport`).

/// UCI commands that can be sent to an engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    /// Initialize UCI mode
    Uci,
    /// Readiness query, answered by "readyok"
    IsReady,
    /// Tell the engine a new game starts
    UciNewGame,
    /// Set an engine option; buttons have no value
    SetOption { name: String, value: Option<String> },
    /// Starting position followed by the full move history
    Position { fen: Option<String>, moves: Vec<String> },
    /// Search to a fixed depth
    GoDepth(u32),
    /// Stop searching
    Stop,
    /// Quit the engine
    Quit,
}

impl UciCommand {
    pub fn set_option(name: &str, value: impl ToString) -> Self {
        UciCommand::SetOption {
            name: name.to_string(),
            value: Some(value.to_string()),
        }
    }

    pub fn button(name: &str) -> Self {
        UciCommand::SetOption {
            name: name.to_string(),
            value: None,
        }
    }

    /// Convert command to UCI protocol string
    pub fn to_uci_string(&self) -> String {
        match self {
            UciCommand::Uci => "uci".to_string(),
            UciCommand::IsReady => "isready".to_string(),
            UciCommand::UciNewGame => "ucinewgame".to_string(),
            UciCommand::SetOption { name, value } => match value {
                Some(v) => format!("setoption name {} value {}", name, v),
                None => format!("setoption name {}", name),
            },
            UciCommand::Position { fen, moves } => {
                let mut cmd = String::from("position ");
                match fen {
                    Some(f) => {
                        cmd.push_str("fen ");
                        cmd.push_str(f);
                    }
                    None => cmd.push_str("startpos"),
                }
                if !moves.is_empty() {
                    cmd.push_str(" moves ");
                    cmd.push_str(&moves.join(" "));
                }
                cmd
            }
            UciCommand::GoDepth(d) => format!("go depth {}", d),
            UciCommand::Stop => "stop".to_string(),
            UciCommand::Quit => "quit".to_string(),
        }
    }
}

/// Categorized engine output line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciOutputKind {
    /// "uciok" - handshake finished
    UciOk,
    /// "readyok" - answer to "isready"
    ReadyOk,
    /// "info ..." - search information
    Info(String),
    /// "bestmove ..." - search result
    BestMove(BestMove),
    /// Engine identification
    Id(String),
    /// Option definition
    Option(String),
    /// Unknown/other output
    Other(String),
}

impl UciOutputKind {
    /// Parse a raw UCI output line into a categorized type
    pub fn parse(line: &str) -> Self {
        let line = line.trim();

        if line == "uciok" {
            UciOutputKind::UciOk
        } else if line == "readyok" {
            UciOutputKind::ReadyOk
        } else if let Some(rest) = line.strip_prefix("info ") {
            UciOutputKind::Info(rest.to_string())
        } else if line == "bestmove" || line.starts_with("bestmove ") {
            UciOutputKind::BestMove(BestMove::parse(&line["bestmove".len()..]))
        } else if let Some(rest) = line.strip_prefix("id ") {
            UciOutputKind::Id(rest.to_string())
        } else if let Some(rest) = line.strip_prefix("option ") {
            UciOutputKind::Option(rest.to_string())
        } else {
            UciOutputKind::Other(line.to_string())
        }
    }
}

/// A "bestmove" reply. The ponder suggestion is kept but never acted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestMove {
    /// Move token as reported; `None` for "(none)" or a missing token
    pub mv: Option<String>,
    pub ponder: Option<String>,
}

impl BestMove {
    /// Parse the text after "bestmove"
    pub fn parse(rest: &str) -> Self {
        let mut tokens = rest.split_whitespace();
        let mv = tokens
            .next()
            .filter(|t| *t != "(none)" && *t != "0000")
            .map(str::to_string);
        let mut ponder = None;
        while let Some(token) = tokens.next() {
            if token == "ponder" {
                ponder = tokens.next().map(str::to_string);
            }
        }
        Self { mv, ponder }
    }
}
