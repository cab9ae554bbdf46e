//! Command-line driver for the KinTree core engine.
//!
//! # Responsibility
//! - Map text commands onto editor operations (the inbound command
//!   surface of the core).
//! - Print the member list after each committed operation, the way a
//!   rendering surface would consume it.

use kintree_core::db::{open_db, open_db_in_memory};
use kintree_core::{
    core_version, default_log_level, init_logging, LayoutMode, Member, MemberPersistence,
    SqliteMemberRepository, TreeEditor, TreeExport,
};
use log::{info, warn};
use std::error::Error;
use std::io::{self, BufRead, Write};

const USAGE: &str = "commands:
  list                     print all members
  add-root                 create a new parentless member
  add-child <id>           create a child of member <id>
  add-parent <id>          create a parent of member <id>
  add-spouse <id>          create a spouse for member <id>
  rename <id> <name...>    rename member <id>
  move <id> <x> <y>        reposition member <id> (pins the position)
  delete <id>              delete member <id>
  export [path]            print or write the JSON export
  quit                     exit";

fn main() {
    if let Err(err) = run() {
        eprintln!("kintree: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    if let Ok(log_dir) = std::env::var("KINTREE_LOG_DIR") {
        init_logging(default_log_level(), &log_dir)?;
    }

    let db_path = parse_db_path()?;
    let conn = match &db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let repo = SqliteMemberRepository::try_new(&conn)?;
    let mut editor = TreeEditor::load(repo, LayoutMode::AutoArrange)?;
    info!(
        "event=cli_start module=cli status=ok members={}",
        editor.members().len()
    );

    println!("kintree {} ({} members loaded)", core_version(), editor.members().len());
    println!("{USAGE}");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = tokens.split_first() else {
            continue;
        };

        match command {
            "quit" | "exit" => break,
            "help" => println!("{USAGE}"),
            "list" => print_members(editor.members()),
            "export" => match TreeExport::new(editor.members()).to_json() {
                Ok(json) => match args.first() {
                    Some(path) => {
                        std::fs::write(path, json)?;
                        println!("export written to {path}");
                    }
                    None => println!("{json}"),
                },
                Err(err) => println!("error: {err}"),
            },
            _ => {
                match apply_command(&mut editor, command, args) {
                    Ok(message) => {
                        info!("event=command module=cli status=ok command={command}");
                        println!("{message}");
                        print_members(editor.members());
                    }
                    Err(err) => {
                        warn!("event=command module=cli status=error command={command} error={err}");
                        println!("error: {err}");
                    }
                };
            }
        }
    }

    Ok(())
}

fn apply_command<P: MemberPersistence>(
    editor: &mut TreeEditor<P>,
    command: &str,
    args: &[&str],
) -> Result<String, Box<dyn Error>> {
    match command {
        "add-root" => {
            let id = editor.add_root()?;
            Ok(format!("created root member {id}"))
        }
        "add-child" => {
            let parent_id = parse_id(args.first())?;
            let id = editor.add_child(parent_id)?;
            Ok(format!("created child {id} of member {parent_id}"))
        }
        "add-parent" => {
            let child_id = parse_id(args.first())?;
            let id = editor.add_parent(child_id)?;
            Ok(format!("created parent {id} of member {child_id}"))
        }
        "add-spouse" => {
            let member_id = parse_id(args.first())?;
            let id = editor.add_spouse(member_id)?;
            Ok(format!("created spouse {id} of member {member_id}"))
        }
        "rename" => {
            let id = parse_id(args.first())?;
            let name = args[1..].join(" ");
            editor.rename_member(id, name)?;
            Ok(format!("renamed member {id}"))
        }
        "move" => {
            let id = parse_id(args.first())?;
            let x: f64 = parse_number(args.get(1))?;
            let y: f64 = parse_number(args.get(2))?;
            editor.reposition_member(id, x, y)?;
            Ok(format!("moved member {id}"))
        }
        "delete" => {
            let id = parse_id(args.first())?;
            editor.delete_member(id)?;
            Ok(format!("deleted member {id}"))
        }
        other => Ok(format!("unknown command `{other}` (try `help`)")),
    }
}

fn parse_db_path() -> Result<Option<String>, Box<dyn Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => Ok(None),
        [flag, path] if flag.as_str() == "--db" => Ok(Some(path.clone())),
        _ => Err("usage: kintree_cli [--db <path>]".into()),
    }
}

fn parse_id(token: Option<&&str>) -> Result<i64, Box<dyn Error>> {
    token
        .ok_or("missing member id")?
        .parse::<i64>()
        .map_err(|_| "member id must be an integer".into())
}

fn parse_number(token: Option<&&str>) -> Result<f64, Box<dyn Error>> {
    token
        .ok_or("missing coordinate")?
        .parse::<f64>()
        .map_err(|_| "coordinate must be numeric".into())
}

fn print_members(members: &[Member]) {
    println!("  id  gen  name                 pos            parents      children     spouse");
    for member in members {
        println!(
            "  {:<3} {:<4} {:<20} ({:>5.0},{:>5.0})  {:<12} {:<12} {}",
            member.id,
            member.generation,
            member.name,
            member.x,
            member.y,
            format_ids(&member.parent_ids),
            format_ids(&member.children),
            member
                .spouse_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
    }
}

fn format_ids(ids: &[i64]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
