use std::{
    env,
    fs::read_to_string,
    path::{Path, PathBuf},
    process::exit,
    rc::Rc,
    time::Instant,
};

use typeck::{
    errors::errors::{Error, ErrorTip, Severity},
    get_line_at_position,
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::{type_check, CheckOptions},
};

fn main() {
    tracing_subscriber::fmt::try_init().ok();

    let args: Vec<String> = env::args().collect();

    let Some(file_path) = args.get(1) else {
        let program = args.first().map(String::as_str).unwrap_or("typeck");
        eprintln!("Usage: {} <file> [--warn-shadowing]", program);
        exit(2);
    };

    let options = CheckOptions {
        warn_on_shadowing: args.iter().any(|arg| arg == "--warn-shadowing"),
        ..CheckOptions::default()
    };

    let file_name = file_path.rsplit('/').next().unwrap_or(file_path).to_string();
    let file = PathBuf::from(file_path);

    let contents = match read_to_string(&file) {
        Ok(contents) => contents,
        Err(error) => {
            eprintln!("Failed to read {}: {}", file.display(), error);
            exit(2);
        }
    };

    let start = Instant::now();

    let tokens = match tokenize(contents.clone(), Some(file_name.clone())) {
        Ok(tokens) => tokens,
        Err(error) => {
            display_error(&error, &file, &contents);
            exit(1);
        }
    };

    println!("Tokenized in {:?}", start.elapsed());

    let parse_start = Instant::now();
    let ast = match parse(tokens, Rc::new(file_name)) {
        Ok(ast) => ast,
        Err(error) => {
            display_error(&error, &file, &contents);
            exit(1);
        }
    };

    println!("Parsed in {:?}", parse_start.elapsed());

    let type_check_start = Instant::now();
    let module = match type_check(&ast, options) {
        Ok(module) => module,
        Err(error) => {
            eprintln!("Internal error: {}", error);
            exit(3);
        }
    };

    println!("Type checked in {:?}", type_check_start.elapsed());

    for error in &module.errors {
        display_error(error, &file, &contents);
    }

    for symbol in module.items() {
        match &symbol.ty {
            Some(ty) => println!("{} {}: {}", symbol.kind.describe(), symbol.name, ty),
            None => println!("{} {}: <error>", symbol.kind.describe(), symbol.name),
        }
    }

    println!("Total time: {:?}", start.elapsed());

    if module.has_errors() {
        exit(1);
    }
}

fn display_error(error: &Error, file: &Path, contents: &str) {
    /*
        error: message
        -> final.lang
           |
        20 | a := #
           | -----^
    */

    let label = match error.get_severity() {
        Severity::Error => "Error",
        Severity::Warning => "Warning",
    };

    if let ErrorTip::None = error.get_tip() {
        println!("{}: {} ({})", label, error.get_error_name(), error);
    } else {
        println!(
            "{}: {} ({}) - {}",
            label,
            error.get_error_name(),
            error,
            error.get_tip()
        );
    }
    println!("-> {}", file.display());

    let position = error.get_position();
    let Some((line, line_text, line_pos)) = get_line_at_position(contents, position.0) else {
        return;
    };

    let line_str = line.to_string();
    let padding = line_str.len() + 2;

    println!("{:>padding$}", "|");

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    println!("{} | {}", line_str, line_text_removed.trim_end());

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;

    println!("{:>padding$} {:->arrows$}", "|", "^");

    if let Some(ty) = error.get_partial_type() {
        println!("{:>padding$} partial type: {}", "|", ty);
    }
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let start = string
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .count();

    (String::from(&string[start..]), start)
}
