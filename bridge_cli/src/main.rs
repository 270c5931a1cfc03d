//! # Bridge CLI
//!
//! Line-oriented editor for a bridge layout. Each line is one command;
//! `help` lists them. Edits go straight to `bridge_core`, so a rejected
//! command prints the error and leaves the bridge as it was.
//!
//! An opened or saved project stays locked until the session moves to
//! another file, starts a new bridge, or quits.
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `info`).

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use bridge_core::bridge::{
    BridgeDescription, CreateGirderGroup, InsertSpan, MemberEnd, MovePierOption, PierFace, RemovePier,
    SegmentConnection, TemporarySupportData, TemporarySupportEvents,
};
use bridge_core::errors::{BridgeError, BridgeResult};
use bridge_core::file_io::{load_project, save_project, FileLock};
use bridge_core::project::Project;
use bridge_core::timeline::{EventIndex, Timeline};
use bridge_core::units::{Feet, Station};
use tracing::info;
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
Commands:
  show                                   print the layout
  validate                               run the structural checks
  new <station> <length>                 start a one-span bridge
  open <path> | save [path]              read or write a .bdg project
  event <name>                           append a construction event
  insert <pier> back|ahead <length> [group]
  append <length>
  group <group> start|end <len,len,..> <girders>
  remove-span <span> prev|next
  remove-group <group> prev|next
  move <pier> <station> bridge|prev|next|adjacent
  length <span> <length>
  ts-add <station> <erect> <remove> [closure <event>]
  ts-remove <index>
  connection <pier> continuous | closure <event>
  same-girders on|off
  girders <count> | girders <group> <count>
  quit
Stations accept feet (1234.5) or sta+offset (12+34.50).";

// ============================================================================
// Commands
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Help,
    Show,
    Validate,
    Quit,
    New { start_ft: f64, length_ft: f64 },
    Open(PathBuf),
    Save(Option<PathBuf>),
    Event(String),
    Insert { pier: usize, face: PierFace, length_ft: f64, new_group: bool },
    Append { length_ft: f64 },
    CreateGroup { group: usize, end: MemberEnd, lengths_ft: Vec<f64>, girders: usize },
    RemoveSpan { span: usize, pier: RemovePier },
    RemoveGroup { group: usize, pier: RemovePier },
    Move { pier: usize, station_ft: f64, option: MovePierOption },
    SpanLength { span: usize, length_ft: f64 },
    AddSupport { station_ft: f64, erect: EventIndex, remove: EventIndex, closure: Option<EventIndex> },
    RemoveSupport { index: usize },
    Connection { pier: usize, closure: Option<EventIndex> },
    SameGirders(bool),
    GirderCount { group: Option<usize>, count: usize },
}

fn bad(field: &str, value: &str, reason: &str) -> BridgeError {
    BridgeError::invalid_input(field, value, reason)
}

/// Positional arguments of one command line.
struct Args<'a> {
    words: std::slice::Iter<'a, &'a str>,
}

impl<'a> Args<'a> {
    fn next(&mut self, field: &str) -> BridgeResult<&'a str> {
        self.words.next().copied().ok_or_else(|| bad(field, "", "missing argument"))
    }

    fn opt(&mut self) -> Option<&'a str> {
        self.words.next().copied()
    }

    fn index(&mut self, field: &str) -> BridgeResult<usize> {
        let word = self.next(field)?;
        word.parse().map_err(|_| bad(field, word, "expected a non-negative integer"))
    }

    fn length(&mut self, field: &str) -> BridgeResult<f64> {
        parse_length(field, self.next(field)?)
    }

    fn station(&mut self, field: &str) -> BridgeResult<f64> {
        let word = self.next(field)?;
        word.parse::<Station>().map(|s| s.0)
    }

    fn remove_pier(&mut self) -> BridgeResult<RemovePier> {
        match self.next("pier")? {
            "prev" => Ok(RemovePier::PrevPier),
            "next" => Ok(RemovePier::NextPier),
            other => Err(bad("pier", other, "expected prev or next")),
        }
    }

    fn finish(mut self) -> BridgeResult<()> {
        match self.opt() {
            Some(extra) => Err(bad("arguments", extra, "unexpected argument")),
            None => Ok(()),
        }
    }
}

fn parse_length(field: &str, word: &str) -> BridgeResult<f64> {
    word.parse().map_err(|_| bad(field, word, "expected a length in feet"))
}

fn parse_command(line: &str) -> BridgeResult<Option<Command>> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&name, rest)) = words.split_first() else {
        return Ok(None);
    };
    let mut args = Args { words: rest.iter() };
    let command = match name {
        "help" | "?" => Command::Help,
        "show" => Command::Show,
        "validate" => Command::Validate,
        "quit" | "exit" => Command::Quit,
        "new" => Command::New {
            start_ft: args.station("station")?,
            length_ft: args.length("length")?,
        },
        "open" => Command::Open(PathBuf::from(args.next("path")?)),
        "save" => Command::Save(args.opt().map(PathBuf::from)),
        "event" => {
            let name = rest.join(" ");
            if name.is_empty() {
                return Err(bad("name", "", "an event needs a name"));
            }
            return Ok(Some(Command::Event(name)));
        }
        "insert" => {
            let pier = args.index("pier")?;
            let face = match args.next("face")? {
                "back" => PierFace::Back,
                "ahead" => PierFace::Ahead,
                other => return Err(bad("face", other, "expected back or ahead")),
            };
            let length_ft = args.length("length")?;
            let new_group = match args.opt() {
                None => false,
                Some("group") => true,
                Some(other) => return Err(bad("group", other, "expected 'group'")),
            };
            Command::Insert {
                pier,
                face,
                length_ft,
                new_group,
            }
        }
        "append" => Command::Append {
            length_ft: args.length("length")?,
        },
        "group" => {
            let group = args.index("group")?;
            let end = match args.next("end")? {
                "start" => MemberEnd::Start,
                "end" => MemberEnd::End,
                other => return Err(bad("end", other, "expected start or end")),
            };
            let lengths_ft = args
                .next("lengths")?
                .split(',')
                .map(|w| parse_length("lengths", w))
                .collect::<BridgeResult<Vec<_>>>()?;
            Command::CreateGroup {
                group,
                end,
                lengths_ft,
                girders: args.index("girders")?,
            }
        }
        "remove-span" => Command::RemoveSpan {
            span: args.index("span")?,
            pier: args.remove_pier()?,
        },
        "remove-group" => Command::RemoveGroup {
            group: args.index("group")?,
            pier: args.remove_pier()?,
        },
        "move" => {
            let pier = args.index("pier")?;
            let station_ft = args.station("station")?;
            let option = match args.next("option")? {
                "bridge" => MovePierOption::MoveBridge,
                "prev" => MovePierOption::AdjustPrevSpan,
                "next" => MovePierOption::AdjustNextSpan,
                "adjacent" => MovePierOption::AdjustAdjacentSpans,
                other => return Err(bad("option", other, "expected bridge, prev, next or adjacent")),
            };
            Command::Move {
                pier,
                station_ft,
                option,
            }
        }
        "length" => Command::SpanLength {
            span: args.index("span")?,
            length_ft: args.length("length")?,
        },
        "ts-add" => {
            let station_ft = args.station("station")?;
            let erect = args.index("erect")?;
            let remove = args.index("remove")?;
            let closure = match args.opt() {
                None => None,
                Some("closure") => Some(args.index("closure event")?),
                Some(other) => return Err(bad("connection", other, "expected 'closure'")),
            };
            Command::AddSupport {
                station_ft,
                erect,
                remove,
                closure,
            }
        }
        "ts-remove" => Command::RemoveSupport {
            index: args.index("index")?,
        },
        "connection" => {
            let pier = args.index("pier")?;
            let closure = match args.next("connection")? {
                "continuous" => None,
                "closure" => Some(args.index("closure event")?),
                other => return Err(bad("connection", other, "expected continuous or closure")),
            };
            Command::Connection { pier, closure }
        }
        "same-girders" => match args.next("setting")? {
            "on" => Command::SameGirders(true),
            "off" => Command::SameGirders(false),
            other => return Err(bad("setting", other, "expected on or off")),
        },
        "girders" => {
            let first = args.index("count")?;
            match args.opt() {
                None => Command::GirderCount { group: None, count: first },
                Some(word) => Command::GirderCount {
                    group: Some(first),
                    count: word.parse().map_err(|_| bad("count", word, "expected a girder count"))?,
                },
            }
        }
        other => return Err(bad("command", other, "unknown command, try 'help'")),
    };
    args.finish()?;
    Ok(Some(command))
}

// ============================================================================
// Session
// ============================================================================

struct Session {
    project: Project,
    path: Option<PathBuf>,
    lock: Option<FileLock>,
    user: String,
}

impl Session {
    fn new(user: impl Into<String>) -> Self {
        Session {
            project: Project::default(),
            path: None,
            lock: None,
            user: user.into(),
        }
    }

    /// A fresh lock for `path`, or `None` when the session already holds it.
    fn lock_for(&self, path: &Path) -> BridgeResult<Option<FileLock>> {
        match &self.lock {
            Some(lock) if lock.covers(path) => Ok(None),
            _ => FileLock::acquire(path, self.user.as_str()).map(Some),
        }
    }

    /// Switch to `path`; the previous file's lock is released.
    fn adopt_path(&mut self, path: PathBuf, lock: Option<FileLock>) {
        if lock.is_some() {
            self.lock = lock;
        }
        self.path = Some(path);
    }

    /// Run one command. Returns false when the session should end.
    fn execute(&mut self, command: Command, out: &mut impl Write) -> BridgeResult<bool> {
        let Project { bridge, timeline, .. } = &mut self.project;
        let edited = match command {
            Command::Help => {
                write_line(out, HELP)?;
                false
            }
            Command::Quit => {
                self.lock = None;
                return Ok(false);
            }
            Command::Show => {
                write_line(out, &render_layout(bridge, timeline))?;
                false
            }
            Command::Validate => {
                let violations = bridge.violations();
                if violations.is_empty() {
                    write_line(out, "bridge is consistent")?;
                }
                for v in violations {
                    write_line(out, &format!("  {}", v))?;
                }
                false
            }
            Command::New { start_ft, length_ft } => {
                self.project = Project::default().with_bridge(BridgeDescription::new(start_ft, length_ft)?);
                self.path = None;
                self.lock = None;
                true
            }
            Command::Open(path) => {
                let lock = self.lock_for(&path)?;
                self.project = load_project(&path)?;
                self.adopt_path(path, lock);
                false
            }
            Command::Save(path) => {
                let path = path
                    .or_else(|| self.path.clone())
                    .ok_or_else(|| bad("path", "", "no file name yet, use 'save <path>'"))?;
                let lock = self.lock_for(&path)?;
                save_project(&self.project, &path)?;
                self.adopt_path(path, lock);
                false
            }
            Command::Event(name) => {
                let index = timeline.add_event(name);
                write_line(out, &format!("event {}", index))?;
                true
            }
            Command::Insert {
                pier,
                face,
                length_ft,
                new_group,
            } => {
                let mut req = InsertSpan::new(pier, face, length_ft);
                if new_group {
                    req = req.with_new_group();
                }
                let span = bridge.insert_span(timeline, req)?;
                write_line(out, &format!("span {} added", span))?;
                true
            }
            Command::Append { length_ft } => {
                let span = bridge.append_span(timeline, length_ft)?;
                write_line(out, &format!("span {} added", span))?;
                true
            }
            Command::CreateGroup {
                group,
                end,
                lengths_ft,
                girders,
            } => {
                let g = bridge.create_girder_group(timeline, CreateGirderGroup::new(group, end, lengths_ft, girders))?;
                write_line(out, &format!("group {} added", g))?;
                true
            }
            Command::RemoveSpan { span, pier } => {
                bridge.remove_span(timeline, span, pier)?;
                true
            }
            Command::RemoveGroup { group, pier } => {
                bridge.remove_girder_group(timeline, group, pier)?;
                true
            }
            Command::Move {
                pier,
                station_ft,
                option,
            } => bridge.move_pier(pier, station_ft, option)?,
            Command::SpanLength { span, length_ft } => {
                bridge.set_span_length(span, length_ft)?;
                true
            }
            Command::AddSupport {
                station_ft,
                erect,
                remove,
                closure,
            } => {
                let mut events = TemporarySupportEvents::new(erect, remove);
                let data = match closure {
                    Some(event) => {
                        events = events.with_closure(event);
                        TemporarySupportData::closure_joint(station_ft)
                    }
                    None => TemporarySupportData::new(station_ft),
                };
                let id = bridge.add_temporary_support(timeline, data, events)?;
                write_line(out, &format!("temporary support {} added", id))?;
                true
            }
            Command::RemoveSupport { index } => {
                let id = bridge
                    .temporary_support(index)
                    .map(|t| t.id())
                    .ok_or_else(|| BridgeError::not_found("Temporary support", index))?;
                bridge.remove_temporary_support(timeline, id)?;
                true
            }
            Command::Connection { pier, closure } => {
                let connection = match closure {
                    Some(_) => SegmentConnection::ContinuousClosureJoint,
                    None => SegmentConnection::ContinuousSegment,
                };
                bridge.set_segment_connection(timeline, pier, connection, closure)?;
                true
            }
            Command::SameGirders(enabled) => {
                bridge.set_same_number_of_girders(timeline, enabled)?;
                true
            }
            Command::GirderCount { group: None, count } => {
                bridge.set_girder_count(timeline, count)?;
                true
            }
            Command::GirderCount {
                group: Some(group),
                count,
            } => {
                bridge.set_group_girder_count(timeline, group, count)?;
                true
            }
        };
        if edited {
            self.project.touch();
        }
        Ok(true)
    }
}

fn write_line(out: &mut impl Write, text: &str) -> BridgeResult<()> {
    writeln!(out, "{}", text).map_err(|e| BridgeError::file_error("write", "stdout", e.to_string()))
}

/// Human-readable table of piers, groups and temporary supports.
fn render_layout(bridge: &BridgeDescription, timeline: &dyn Timeline) -> String {
    let (start, end) = bridge.station_range();
    let mut lines = vec![format!(
        "Bridge {} to {} ({}), {} spans, {} groups, {} closure joints per girder line",
        Station(start),
        Station(end),
        Feet(bridge.length()),
        bridge.span_count(),
        bridge.group_count(),
        bridge.closure_joint_count()
    )];

    for pier in bridge.piers() {
        let erected = timeline
            .pier_erection_event(pier.id())
            .map_or_else(|| "-".to_string(), |e| e.to_string());
        let connection = if bridge.is_boundary_pier(pier.index()) {
            pier.boundary_condition().display_name()
        } else {
            pier.segment_connection().display_name()
        };
        lines.push(format!(
            "  pier {:>2} (id {:>2})  {:>10}  erect {:>2}  {}",
            pier.index(),
            pier.id(),
            Station(pier.station()).to_string(),
            erected,
            connection
        ));
    }

    for (g, group) in bridge.girder_groups().iter().enumerate() {
        let (first, last) = bridge.group_pier_range(g).unwrap_or_default();
        let segments = group.girder(0).map_or(0, |gdr| gdr.segment_count());
        lines.push(format!(
            "  group {:>2} (id {:>2})  piers {}-{}  {} girders x {} segments  {}",
            g,
            group.id(),
            first,
            last,
            group.girder_count(),
            segments,
            group.girder_name(0).unwrap_or("-")
        ));
    }

    for ts in bridge.temporary_supports() {
        lines.push(format!(
            "  ts {:>2} (id {:>2})  {:>10}  span {}  {}, {}",
            ts.index(),
            ts.id(),
            Station(ts.station()).to_string(),
            ts.span(),
            ts.support_type().display_name(),
            ts.connection().display_name()
        ));
    }
    lines.join("\n")
}

/// Error line for the terminal, with a hint for errors the user can act on.
fn describe_error(e: &BridgeError) -> String {
    let mut text = format!("error [{}]: {}", e.error_code(), e);
    if e.is_recoverable() {
        text.push_str("\n  close the project in the other session, or open another file");
    } else if e.is_load_failure() {
        text.push_str("\n  the file was not opened; the current bridge is unchanged");
    }
    text
}

fn user_id() -> String {
    ["USER", "USERNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    println!("Bridge CLI - girder bridge layout editor");
    println!("========================================");
    println!("Type 'help' for commands.");

    let mut session = Session::new(user_id());
    if let Some(path) = std::env::args().nth(1) {
        match session.execute(Command::Open(PathBuf::from(path)), &mut io::stdout()) {
            Ok(_) => info!("project opened"),
            Err(e) => eprintln!("{}", describe_error(&e)),
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("bridge> ");
        if stdout.flush().is_err() {
            break;
        }
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let result = parse_command(&line).and_then(|command| match command {
            Some(command) => session.execute(command, &mut stdout),
            None => Ok(true),
        });
        match result {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => eprintln!("{}", describe_error(&e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(session: &mut Session, lines: &[&str]) -> String {
        let mut out = Vec::new();
        for line in lines {
            let command = parse_command(line).unwrap().unwrap();
            session.execute(command, &mut out).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_insert() {
        let command = parse_command("insert 1 ahead 80 group").unwrap();
        assert_eq!(
            command,
            Some(Command::Insert {
                pier: 1,
                face: PierFace::Ahead,
                length_ft: 80.0,
                new_group: true
            })
        );
    }

    #[test]
    fn test_parse_station_forms() {
        let feet = parse_command("move 1 1234.5 prev").unwrap();
        let sta = parse_command("move 1 12+34.50 prev").unwrap();
        assert_eq!(feet, sta);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("").unwrap().is_none());
        assert!(parse_command("frobnicate").is_err());
        assert!(parse_command("remove-span 0 sideways").is_err());
        assert!(parse_command("append 100 200").is_err());
        assert!(parse_command("group 0 end 100,x 5").is_err());
    }

    #[test]
    fn test_session_edits() {
        let mut session = Session::new("tester");
        let out = run(
            &mut session,
            &[
                "new 0 100",
                "event Erect",
                "event Remove",
                "append 120",
                "ts-add 150 0 1",
                "group 0 end 90,90 5",
            ],
        );
        assert!(out.contains("span 1 added"));
        assert!(out.contains("group 1 added"));
        let bridge = &session.project.bridge;
        assert_eq!(bridge.span_count(), 4);
        assert_eq!(bridge.temporary_support_count(), 1);
        assert!(bridge.validate().is_ok());
    }

    #[test]
    fn test_rejected_edit_leaves_bridge() {
        let mut session = Session::new("tester");
        run(&mut session, &["new 0 100"]);
        let before = session.project.bridge.clone();
        let command = parse_command("remove-span 0 prev").unwrap().unwrap();
        assert!(session.execute(command, &mut Vec::<u8>::new()).is_err());
        assert_eq!(session.project.bridge, before);
    }

    #[test]
    fn test_show_lists_piers() {
        let mut session = Session::new("tester");
        let out = run(&mut session, &["new 1000 100", "show"]);
        assert!(out.contains("10+00.00"));
        assert!(out.contains("11+00.00"));
        assert!(out.contains("group  0"));
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bridge_cli_{}_{}.bdg", name, std::process::id()))
    }

    #[test]
    fn test_open_project_stays_locked() {
        let path = temp_path("locked");
        let mut first = Session::new("first");
        run(&mut first, &["new 0 100", format!("save {}", path.display()).as_str()]);
        assert!(first.lock.as_ref().is_some_and(|l| l.covers(&path)));

        let mut second = Session::new("second");
        let err = second.execute(Command::Open(path.clone()), &mut Vec::<u8>::new()).unwrap_err();
        assert!(matches!(err, BridgeError::FileLocked { .. }));
        assert!(describe_error(&err).contains("other session"));
        assert!(second.path.is_none());

        // saving again keeps the same lock
        run(&mut first, &["append 50", "save"]);
        run(&mut first, &["new 0 80"]);
        assert!(first.lock.is_none());
        run(&mut second, &[format!("open {}", path.display()).as_str()]);
        assert_eq!(second.project.bridge.span_count(), 2);
        assert!(second.execute(Command::Quit, &mut Vec::<u8>::new()).is_ok_and(|go_on| !go_on));
        assert!(second.lock.is_none());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_failed_open_keeps_current_project() {
        let path = temp_path("current");
        let missing = temp_path("missing");
        let mut session = Session::new("tester");
        run(&mut session, &["new 0 100", format!("save {}", path.display()).as_str()]);

        let err = session.execute(Command::Open(missing.clone()), &mut Vec::<u8>::new()).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
        assert_eq!(session.path.as_deref(), Some(path.as_path()));
        assert!(session.lock.as_ref().is_some_and(|l| l.covers(&path)));
        assert!(!missing.with_extension("bdg.lock").exists());
        drop(session);
        let _ = std::fs::remove_file(&path);
    }
}
