mod reply;

use std::error::Error;
use std::fs;
use std::io::{stdin, stdout, BufRead, Write};
use std::sync::Arc;

use clap::{Arg, ArgAction, ArgMatches, Command};
use rand::Rng;

use crate::card_cache::CardCache;
use crate::card_fetcher::CardInfoProvider;
use crate::config::DraftConfig;
use crate::context::{self, RuntimeData, CUSTOM_CUBE_KEY};
use crate::deck_list;
use crate::display::{self, MESSAGE_LIMIT};
use crate::draft::DraftState;
use crate::models::card_info::card_link;
use crate::models::player::Player;
use crate::opt::{ErrToStr, Res};
use crate::quotes::{get_quote, Quote};

pub use self::reply::Reply;

const SAMPLE_SIZE: usize = 5;

/// One terminal session: the loaded card list and at most one running draft.
pub struct Session {
    config: DraftConfig,
    provider: Arc<dyn CardInfoProvider>,
    runtime_data: Option<RuntimeData>,
    draft_file: String,
    draft: Option<DraftState>,
    last_action: String,
}

impl Session {
    pub fn new(
        config: DraftConfig,
        provider: Arc<dyn CardInfoProvider>,
        runtime_data: Option<RuntimeData>,
    ) -> Self {
        let draft_file = runtime_data
            .as_ref()
            .and_then(|data| data.read_data(CUSTOM_CUBE_KEY))
            .unwrap_or_else(|| config.cube_file.clone());

        Session {
            config,
            provider,
            runtime_data,
            draft_file,
            draft: None,
            last_action: String::new(),
        }
    }

    #[cfg(test)]
    pub fn draft(&self) -> Option<&DraftState> {
        self.draft.as_ref()
    }

    /// Runs one input line. Returns `true` when the session should end.
    pub async fn respond(&mut self, line: &str, reply: &mut Reply) -> Result<bool, Box<dyn Error>> {
        let args = shlex::split(line).ok_or("error: Invalid quoting")?;
        let matches = cli().try_get_matches_from(args)?;

        let result = match matches.subcommand() {
            Some(("ping", _)) => {
                reply.add("Pong");
                Ok(())
            }
            Some(("quit", _)) => {
                reply.add("Exiting ...");
                return Ok(true);
            }
            Some(("new", matches)) => self.new_game(matches.get_one::<String>("file"), reply),
            Some(("load", matches)) => self.load_list(required(matches, "file")?, reply),
            Some(("take", matches)) => self.take(acting_player(matches)?, reply),
            Some(("pass", matches)) => self.pass(acting_player(matches)?, reply),
            Some(("piles", matches)) => self.show_piles(matches.get_flag("all"), reply).await,
            Some(("pulls", matches)) => self.show_pulls(matches, reply).await,
            Some(("export", matches)) => self.export(matches, reply),
            Some(("deck", matches)) => {
                let sample_size = matches
                    .get_one::<usize>("count")
                    .copied()
                    .unwrap_or(SAMPLE_SIZE);
                self.require_draft()
                    .map(|draft| reply.add(display::draft_pile(draft, sample_size)))
            }
            Some(("status", _)) => self
                .require_draft()
                .map(|draft| reply.add(display::status(draft, &self.last_action))),
            Some(("cache", _)) => self.show_cache(reply),
            Some(("card", matches)) => {
                let name = matches
                    .get_many::<String>("name")
                    .map(|parts| parts.map(|s| s.as_str()).collect::<Vec<_>>().join(" "))
                    .unwrap_or_default();
                self.show_card(&name, reply).await
            }
            Some(("auto", _)) => self.auto_play(reply),
            Some((name, _)) => Err(format!("Unknown command: {}", name)),
            None => unreachable!("subcommand required"),
        };

        if let Err(err) = result {
            reply.add(format!("Err: {}", err));
        }
        Ok(false)
    }

    fn require_draft(&self) -> Res<&DraftState> {
        self.draft
            .as_ref()
            .ok_or_else(|| "No draft in progress.".to_string())
    }

    fn require_draft_mut(&mut self) -> Res<&mut DraftState> {
        self.draft
            .as_mut()
            .ok_or_else(|| "No draft in progress.".to_string())
    }

    fn new_game(&mut self, file: Option<&String>, reply: &mut Reply) -> Res<()> {
        let path = file.cloned().unwrap_or_else(|| self.draft_file.clone());
        let text = fs::read_to_string(&path).err_to_str()?;
        let cache = CardCache::new(self.provider.clone(), self.config.prefetch_workers).err_to_str()?;

        let draft = DraftState::new_game(
            text.lines(),
            self.config.card_limit,
            &mut rand::thread_rng(),
            Some(Arc::new(cache)),
        )
        .err_to_str()?;
        self.last_action = get_quote(Quote::Start).to_string();
        reply.add(display::status(&draft, &self.last_action));
        self.draft = Some(draft);

        Ok(())
    }

    fn load_list(&mut self, file: &str, reply: &mut Reply) -> Res<()> {
        let text = fs::read_to_string(file).err_to_str()?;
        let target = context::custom_list_path().err_to_str()?;

        match deck_list::save_custom_list(&target, &text) {
            Ok(entries) => {
                self.draft_file = target.to_string_lossy().to_string();
                if let Some(data) = &self.runtime_data {
                    data.write_data(CUSTOM_CUBE_KEY, &self.draft_file).err_to_str()?;
                }
                reply.add(get_quote(Quote::CardListLoaded));
                reply.add(format!(
                    "{} cards in {} entries",
                    deck_list::card_count(&entries),
                    entries.len()
                ));
                Ok(())
            }
            Err(err) => {
                reply.add(get_quote(Quote::CardListInvalid));
                Err(err.to_string())
            }
        }
    }

    /// Refuses the action when someone other than the current player asks.
    fn authorize(&self, acting: Option<Player>) -> Res<()> {
        let draft = self.require_draft()?;
        if !draft.is_in_progress() {
            return Err("No draft in progress.".to_string());
        }

        match acting {
            Some(player) if player != draft.current_player() => Err(format!(
                "{} ({} is not the current player)",
                get_quote(Quote::NonParticipantAction),
                player
            )),
            _ => Ok(()),
        }
    }

    fn take(&mut self, acting: Option<Player>, reply: &mut Reply) -> Res<()> {
        self.authorize(acting)?;
        let outcome = self.require_draft_mut()?.take().err_to_str()?;

        self.last_action = match outcome.pile {
            Some(pile) => format!(
                "{} {} takes {} ({} cards).",
                get_quote(Quote::TakePile),
                outcome.player,
                pile,
                outcome.cards.len()
            ),
            None => format!("{} has no pile left to take.", outcome.player),
        };
        self.add_status(reply)
    }

    fn pass(&mut self, acting: Option<Player>, reply: &mut Reply) -> Res<()> {
        self.authorize(acting)?;
        let outcome = self.require_draft_mut()?.pass().err_to_str()?;

        let mut action = format!(
            "{} {} passes {}",
            get_quote(Quote::PassPile),
            outcome.player,
            outcome.pile
        );
        if !outcome.grew {
            action.push_str(" (the deck is empty)");
        }
        if outcome.turn_ended {
            action.push_str(match outcome.forced_card {
                Some(_) => " and draws from the deck.",
                None => " and ends the turn.",
            });
        } else {
            action.push('.');
        }
        self.last_action = action;
        self.add_status(reply)
    }

    fn add_status(&self, reply: &mut Reply) -> Res<()> {
        let draft = self.require_draft()?;
        reply.add(display::status(draft, &self.last_action));
        if !draft.is_in_progress() {
            reply.add(get_quote(Quote::DraftComplete));
        }
        Ok(())
    }

    async fn show_piles(&self, incl_all_piles: bool, reply: &mut Reply) -> Res<()> {
        let draft = self.require_draft()?;
        reply.add(display::pick_piles(draft, incl_all_piles).await);
        Ok(())
    }

    async fn show_pulls(&self, matches: &ArgMatches, reply: &mut Reply) -> Res<()> {
        let draft = self.require_draft()?;
        let player = match matches.get_one::<String>("player") {
            Some(s) => parse_player(s)?,
            None => draft.current_player(),
        };

        if matches.get_flag("list") {
            reply.add_boxed(display::pulls_list(draft, player));
        } else if matches.get_flag("all") {
            reply.add(display::both_pulls(draft));
        } else {
            reply.add(display::player_pulls(draft, player).await);
        }
        Ok(())
    }

    fn export(&self, matches: &ArgMatches, reply: &mut Reply) -> Res<()> {
        let draft = self.require_draft()?;
        let player = parse_player(required(matches, "player")?)?;
        let file = required(matches, "file")?;

        fs::write(file, display::pulls_list(draft, player)).err_to_str()?;
        reply.add(format!("{} ({})", get_quote(Quote::PlayerPullsFile), file));
        Ok(())
    }

    fn show_cache(&self, reply: &mut Reply) -> Res<()> {
        let draft = self.require_draft()?;
        let cache = draft
            .card_cache()
            .ok_or_else(|| "No card cache for this draft.".to_string())?;

        if cache.is_empty() {
            reply.add("No cards cached yet.");
            return Ok(());
        }

        reply.add(format!("{} cards cached", cache.len()));
        for (name, state) in cache.entries() {
            reply.add(format!("- {} ({})", name, state));
        }
        Ok(())
    }

    /// Card details from the draft's cache, or straight from the provider
    /// when no draft is running.
    async fn show_card(&self, name: &str, reply: &mut Reply) -> Res<()> {
        let info = match self.draft.as_ref().and_then(|draft| draft.card_cache()) {
            Some(cache) => cache.get(name).await,
            None => Some(self.provider.fetch_card(name).await.err_to_str()?),
        };

        match info {
            Some(info) => reply.add_boxed(info.details()),
            None => reply.add(card_link(name, None)),
        }
        Ok(())
    }

    /// Plays random takes and passes until the draft is over.
    fn auto_play(&mut self, reply: &mut Reply) -> Res<()> {
        let draft = self.require_draft_mut()?;
        let mut rng = rand::thread_rng();
        let mut actions = 0;

        while draft.is_in_progress() {
            if rng.gen_bool(0.5) {
                draft.take().err_to_str()?;
            } else {
                draft.pass().err_to_str()?;
            }
            actions += 1;
        }

        self.last_action = format!("Auto-played {} actions.", actions);
        self.add_status(reply)?;
        if let Some(draft) = &self.draft {
            reply.add(display::both_pulls(draft));
        }
        Ok(())
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Res<&'a str> {
    matches
        .get_one::<String>(name)
        .map(|s| s.as_str())
        .ok_or_else(|| format!("missing argument: {}", name))
}

fn parse_player(s: &str) -> Res<Player> {
    Player::parse(s).ok_or_else(|| format!("unknown player: {}", s))
}

fn acting_player(matches: &ArgMatches) -> Res<Option<Player>> {
    matches
        .get_one::<String>("as")
        .map(|s| parse_player(s))
        .transpose()
}

pub async fn main(session: &mut Session) -> Result<(), Box<dyn Error>> {
    run_session(session, &mut stdin().lock(), &mut stdout()).await
}

/// Reads commands until `quit` or end of input.
async fn run_session<R, W>(
    session: &mut Session,
    input: &mut R,
    output: &mut W,
) -> Result<(), Box<dyn Error>>
where
    R: BufRead,
    W: Write,
{
    loop {
        write!(output, "> ")?;
        output.flush()?;
        let Some(line) = readline(input)? else {
            writeln!(output)?;
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut reply = Reply::new();
        match session.respond(line, &mut reply).await {
            Ok(quit) => {
                if !reply.is_empty() {
                    for chunk in reply.chunks(MESSAGE_LIMIT) {
                        writeln!(output, "{}", chunk)?;
                    }
                    output.flush()?;
                }
                if quit {
                    break;
                }
            }
            Err(err) => {
                write!(output, "{err}")?;
                output.flush()?;
            }
        }
    }

    Ok(())
}

fn cli() -> Command {
    // strip out usage
    const PARSER_TEMPLATE: &str = "\
        {all-args}
    ";
    // strip out name/version
    const COMMAND_TEMPLATE: &str = "\
        {about-with-newline}\n\
        {usage-heading}\n    {usage}\n\
        \n\
        {all-args}{after-help}\
    ";

    let as_player = || {
        Arg::new("as")
            .long("as")
            .value_name("PLAYER")
            .help("Act as this player (1 or 2); refused when it is not their turn")
    };

    Command::new("repl")
        .multicall(true)
        .arg_required_else_help(true)
        .subcommand_required(true)
        .subcommand_value_name("COMMAND")
        .subcommand_help_heading("COMMANDS")
        .help_template(PARSER_TEMPLATE)
        .subcommand(
            Command::new("ping")
                .about("Get a response")
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("new")
                .about("Start a new draft from the loaded or given card list")
                .arg(Arg::new("file"))
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("load")
                .about("Load a custom card list for future drafts")
                .arg(Arg::new("file").required(true))
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("take")
                .about("Take the current pile")
                .arg(as_player())
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("pass")
                .about("Pass the current pile")
                .arg(as_player())
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("piles")
                .about("Show the current pile")
                .arg(Arg::new("all").long("all").action(ArgAction::SetTrue))
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("pulls")
                .about("Show a player's pulls")
                .arg(Arg::new("player"))
                .arg(Arg::new("all").long("all").action(ArgAction::SetTrue))
                .arg(Arg::new("list").long("list").action(ArgAction::SetTrue))
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("export")
                .about("Write a player's pulls to a card list file")
                .arg(Arg::new("player").required(true))
                .arg(Arg::new("file").required(true))
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("deck")
                .about("Show the size and top cards of the draft pile")
                .arg(Arg::new("count").value_parser(clap::value_parser!(usize)))
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("status")
                .about("Show the draft status")
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("cache")
                .about("List cached card lookups")
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("card")
                .about("Show a card's details")
                .arg(Arg::new("name").required(true).num_args(1..))
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("auto")
                .about("Play random actions until the draft ends")
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("quit")
                .alias("exit")
                .alias("q")
                .alias(":q")
                .about("Quit the REPL")
                .help_template(COMMAND_TEMPLATE),
        )
}

/// The next input line, or `None` once the input is exhausted.
fn readline<R: BufRead>(input: &mut R) -> std::io::Result<Option<String>> {
    let mut buffer = String::new();
    if input.read_line(&mut buffer)? == 0 {
        return Ok(None);
    }
    Ok(Some(buffer))
}
