/// A chat command, parsed from a prefixed message
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Command {
    /// `sticker <name>`, show or upload a sticker
    Sticker(Option<String>),
    /// `add <name> <url> [tags...]`
    Add {
        name: String,
        url: String,
        tags: Vec<String>,
    },
    /// `add` with missing arguments
    AddUsage,
    Delete(Option<String>),
    List,
    Help,
    Debug,
    Reload,
    /// Any other word is taken as a sticker name
    Direct(String),
}

/// Parses `content` if it starts with `prefix`
pub fn parse_command(prefix: &str, content: &str) -> Option<Command> {
    let content = content.strip_prefix(prefix)?;
    let mut args = content.split_whitespace();
    let command = args.next()?;

    let command = match command {
        "sticker" => Command::Sticker(args.next().map(String::from)),
        "add" => match (args.next(), args.next()) {
            (Some(name), Some(url)) => Command::Add {
                name: name.to_string(),
                url: url.to_string(),
                tags: args.map(String::from).collect(),
            },
            _ => Command::AddUsage,
        },
        "delete" => Command::Delete(args.next().map(String::from)),
        "list" => Command::List,
        "help" => Command::Help,
        "debug" => Command::Debug,
        "reload" => Command::Reload,
        name => Command::Direct(name.to_string()),
    };
    Some(command)
}

pub fn help_text(prefix: &str) -> String {
    format!(
        "Available commands:
{p}[name] - Get a sticker by name
{p}[name] + upload image - Add or replace a sticker
{p}sticker [name] - Same as {p}[name]
{p}add [name] [url] [tags...] - Add a sticker from a link
{p}delete [name] - Delete a sticker
{p}list - List all stickers
{p}help - Show this help message
{p}debug - Show debug information
{p}reload - Reload stickers from file

Examples:
{p}happy - Get the \"happy\" sticker
{p}happy + upload image - Add a new \"happy\" sticker
{p}list - Show all available stickers",
        p = prefix
    )
}
