use regex::Regex;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

pub const PROCFILE: &str = "Procfile";

/// The `web:` command declared in `<app_dir>/Procfile`.
///
/// Empty when there is no Procfile or it declares no web process.
pub fn find_start_command(app_dir: &Path) -> io::Result<String> {
    let contents = match fs::read_to_string(app_dir.join(PROCFILE)) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(String::new()),
        Err(e) => return Err(e),
    };

    Ok(web_command(&contents).unwrap_or_default())
}

/// First `web:` declaration. The whitespace after the colon may span lines;
/// the command runs to the end of its line.
fn web_command(contents: &str) -> Option<String> {
    static WEB_PROCESS: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"web:\s+(.+)").expect("invalid regex"));

    WEB_PROCESS
        .captures(contents)
        .map(|caps| caps[1].to_string())
}
