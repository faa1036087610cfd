use std::borrow::Cow;
use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::session::{Reply, Session};

const PROMPT: &str = "nlq> ";

pub async fn run(session: &mut Session) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    writeln!(
        stdout,
        "✅ Loaded {} issue(s) from project {}. Type 'help' for examples.\n",
        session.tickets().len(),
        session.jira().project_key
    )?;
    run_with(session, stdin, &mut stdout).await
}

/// Read questions line by line until `exit` or end of input. Bytes that are
/// not valid UTF-8 are replaced rather than ending the session.
pub async fn run_with<R, W>(session: &mut Session, mut input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut buf = Vec::new();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            writeln!(out, "\n👋 Bye!")?;
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        if let Cow::Owned(_) = line {
            warn!("input line was not valid UTF-8");
        }
        match session.handle(&line).await {
            Reply::Nothing => {}
            Reply::Text(text) => writeln!(out, "{text}\n")?,
            Reply::Exit => {
                writeln!(out, "👋 Bye!")?;
                break;
            }
        }
    }
    Ok(())
}
