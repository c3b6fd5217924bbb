//! Interactive stdin/stdout chat session.
//!
//! Turns are strictly sequential: the loop does not read the next line
//! until the current resolution and delivery finish, so a second
//! submission typed early just waits in the stdin buffer.  That is the
//! caller-side guarantee that at most one resolution is ever in flight.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::error;

use istpbot_config::{AppConfig, GenderPreference, PreferenceStore};
use istpbot_runtime::personalize::{quick_questions, welcome_message};
use istpbot_runtime::{
    ConversationLog, DeliveryEvent, DeliveryOutcome, DeliverySequencer, ResponseResolver,
    plain_text, user_facing_message,
};

const THINKING_NOTICE: &str = "💭 답변을 준비하고 있어요...";

pub(crate) async fn run_chat(config: &AppConfig, store: &PreferenceStore) -> Result<()> {
    let prefs = store.load()?;
    let resolver = crate::build_resolver(config)?;
    let sequencer = DeliverySequencer::new(Duration::from_millis(config.delivery.char_interval_ms));
    let mut log = ConversationLog::new();

    let welcome = welcome_message(prefs.gender);
    log.append_bot(welcome);
    println!("{}", plain_text(welcome));
    println!();
    println!("궁금한 것을 입력하세요. /help 로 명령을 볼 수 있습니다.");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        let bytes = stdin.lock().read_line(&mut line)?;
        if bytes == 0 {
            println!();
            println!("session closed");
            break;
        }
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if line == "/exit" {
            println!("session closed");
            break;
        }

        if line == "/help" {
            println!("/help       명령 목록");
            println!("/status     연결 상태와 사용 통계");
            println!("/questions  추천 질문 목록");
            println!("/clear      대화 내용 지우기 (환영 메시지는 유지)");
            println!("/exit       종료");
            continue;
        }

        if line == "/status" {
            let mode = if config.api.has_usable_credential() && !config.api.force_mock {
                "remote"
            } else {
                "local-template"
            };
            println!("bot: {} ({})", config.bot.name, config.bot.type_code);
            println!("response mode: {mode}");
            println!("gender preference: {}", prefs.gender.as_str());
            println!("remote requests: {}", resolver.request_count());
            println!("messages: {}", log.len());
            continue;
        }

        if line == "/questions" {
            for question in quick_questions(prefs.gender) {
                println!("- {question}");
            }
            continue;
        }

        if line == "/clear" {
            log.clear_retaining_first();
            println!("대화 내용을 지웠습니다.");
            continue;
        }

        if line.chars().count() > config.chat.max_message_length {
            println!(
                "메시지가 너무 깁니다 (최대 {}자).",
                config.chat.max_message_length
            );
            continue;
        }

        log.append_user(line);
        submit(&resolver, &sequencer, &mut log, line, prefs.gender).await?;
    }

    Ok(())
}

/// Resolve one turn and stream the reply as a typing effect.  Ctrl-C
/// abandons the rest of an in-flight delivery without ending the session.
async fn submit(
    resolver: &ResponseResolver,
    sequencer: &DeliverySequencer,
    log: &mut ConversationLog,
    input: &str,
    gender: GenderPreference,
) -> Result<()> {
    println!("{THINKING_NOTICE}");

    match resolver.resolve(input, gender).await {
        Ok(result) => {
            let (tx, mut rx) = mpsc::channel(32);
            let cancel = CancellationToken::new();
            let seq = sequencer.clone();
            let text = result.text.clone();
            let cancel_task = cancel.clone();
            let handle =
                tokio::spawn(async move { seq.deliver(&text, &tx, &cancel_task).await });

            let mut printed = 0usize;
            loop {
                tokio::select! {
                    event = rx.recv() => match event {
                        Some(DeliveryEvent::Character { so_far }) => {
                            for ch in so_far.chars().skip(printed) {
                                print!("{ch}");
                                printed += 1;
                            }
                            io::stdout().flush()?;
                        }
                        Some(DeliveryEvent::Completed { .. }) => {
                            println!();
                        }
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => {
                        cancel.cancel();
                    }
                }
            }

            if handle.await? == DeliveryOutcome::Cancelled {
                println!();
                println!("(출력을 건너뛰었습니다)");
            }
            log.append_bot(result.text);
        }
        Err(err) => {
            error!(error = %err, "resolution failed");
            let message = user_facing_message(&err);
            println!("{message}");
            log.append_error(message);
        }
    }

    Ok(())
}
