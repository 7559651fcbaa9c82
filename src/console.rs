use crate::assistant::{intent, Assistant};
use crate::config::Profile;
use crate::error::IrisResult;
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::info;

/// Welcome text shown once per session
pub fn banner(profile: &Profile) -> String {
    let rule = "=".repeat(60);
    let assistant = &profile.assistant_name;
    let user = &profile.user_name;

    [
        format!("🌙{rule}"),
        format!("{assistant} Calendar Assistant initialized"),
        rule.clone(),
        format!("Hello {user}! I'm {assistant}, your intelligent calendar assistant."),
        "I can help you manage your Google Calendar with natural conversation.".to_string(),
        String::new(),
        "You can:".to_string(),
        "• Schedule, Update, Delete, or List events".to_string(),
        "• Or just chat with me!".to_string(),
        String::new(),
        "Examples:".to_string(),
        "  \"Add meeting with Alex tomorrow at 2pm\"".to_string(),
        "  \"What do I have scheduled this week?\"".to_string(),
        "  \"Cancel my 3pm meeting today\"".to_string(),
        rule.clone(),
        "Type 'quit', 'exit', or 'bye' to end our session.".to_string(),
        format!("🌙{rule}"),
        String::new(),
    ]
    .join("\n")
}

pub fn farewell(profile: &Profile) -> String {
    format!(
        "{}: Goodbye {}! Have a great day! 🌙",
        profile.assistant_name, profile.user_name
    )
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, text: &str) -> IrisResult<()> {
    writer.write_all(text.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

async fn prompt<R, W>(lines: &mut Lines<R>, writer: &mut W, label: &str) -> IrisResult<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    writer.write_all(label.as_bytes()).await?;
    writer.flush().await?;
    Ok(lines.next_line().await?)
}

/// Say goodbye on a fresh line after a shutdown signal
async fn interrupted<W: AsyncWrite + Unpin>(writer: &mut W, profile: &Profile) -> IrisResult<()> {
    info!("Session interrupted");
    write_line(writer, "").await?;
    write_line(writer, &farewell(profile)).await
}

/// Run the chat loop until an exit word, end of input, or `shutdown` resolves
///
/// `shutdown` also interrupts a model call or a pending delete confirmation.
pub async fn run_session<R, W, S>(
    assistant: &mut Assistant,
    reader: R,
    mut writer: W,
    shutdown: S,
) -> IrisResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future<Output = ()>,
{
    let profile = assistant.profile().clone();
    let name = profile.assistant_name.clone();
    let mut lines = reader.lines();
    tokio::pin!(shutdown);

    write_line(&mut writer, &banner(&profile)).await?;

    loop {
        let line = tokio::select! {
            line = prompt(&mut lines, &mut writer, "You: ") => line?,
            _ = &mut shutdown => return interrupted(&mut writer, &profile).await,
        };

        let Some(line) = line else {
            info!("Input closed, ending session");
            return Ok(());
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if intent::is_exit_command(input) {
            write_line(&mut writer, &farewell(&profile)).await?;
            return Ok(());
        }

        let outcome = tokio::select! {
            outcome = assistant.handle_turn(input) => outcome?,
            _ = &mut shutdown => return interrupted(&mut writer, &profile).await,
        };
        write_line(&mut writer, &format!("{}: {}", name, outcome.reply.reply)).await?;
        for notice in &outcome.notices {
            write_line(&mut writer, notice).await?;
        }

        if let Some(event) = outcome.pending_delete {
            let question = format!("Do you want to delete '{}'? (y/n): ", event.title());
            let answer = tokio::select! {
                answer = prompt(&mut lines, &mut writer, &question) => answer?.unwrap_or_default(),
                _ = &mut shutdown => return interrupted(&mut writer, &profile).await,
            };
            let notice = assistant.confirm_delete(&event, &answer).await?;
            write_line(&mut writer, &notice).await?;
        }
    }
}
