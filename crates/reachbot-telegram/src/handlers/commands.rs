use std::time::Instant;

use chrono::Utc;

use reachbot_core::{
    broadcast::BroadcastError,
    content::{CaptionStyle, TagLang, DEFAULT_HASHTAGS, MAX_HASHTAGS, MIN_HASHTAGS},
    domain::{ChatId, UserId},
    formatting::{escape_html, format_duration},
    moderation::RecipientProfile,
    Result,
};

use crate::keyboards;
use crate::router::AppState;
use crate::texts;

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

/// `<topic> [style]`: the trailing word is a style only if it names one.
fn parse_caption_args(arg: &str) -> (String, CaptionStyle) {
    let mut words: Vec<&str> = arg.split_whitespace().collect();
    let style = match words.last().and_then(|w| CaptionStyle::parse(w)) {
        Some(style) => {
            words.pop();
            style
        }
        None => CaptionStyle::Viral,
    };
    (words.join(" "), style)
}

/// `<topic> [n] [lang]`: optional trailing language keyword, then an optional
/// trailing one-or-two-digit count (clamped to 10..=30).
fn parse_hashtag_args(arg: &str) -> (String, usize, TagLang) {
    let mut words: Vec<&str> = arg.split_whitespace().collect();

    let lang = match words.last().and_then(|w| TagLang::parse(w)) {
        Some(lang) => {
            words.pop();
            lang
        }
        None => TagLang::Hinglish,
    };

    let n = match words
        .last()
        .filter(|w| w.len() <= 2 && w.chars().all(|c| c.is_ascii_digit()))
        .and_then(|w| w.parse::<usize>().ok())
    {
        Some(n) => {
            words.pop();
            n.clamp(MIN_HASHTAGS, MAX_HASHTAGS)
        }
        None => DEFAULT_HASHTAGS,
    };

    (words.join(" "), n, lang)
}

pub async fn handle_command(
    state: &AppState,
    profile: &RecipientProfile,
    chat: ChatId,
    text: &str,
) -> Result<()> {
    let (cmd, arg) = parse_command(text);
    let operator = state.gatekeeper.is_operator(profile.id);

    match cmd.as_str() {
        "start" => start(state, chat, operator).await,
        "help" => {
            state
                .messenger
                .send_keyboard(chat, &texts::help_text(&state.cfg), keyboards::back())
                .await?;
            Ok(())
        }
        "info" => info(state, profile, chat, operator).await,
        "ping" => ping(state, chat).await,
        "uptime" => {
            let up = format_duration(state.started_at.elapsed().as_secs());
            state
                .messenger
                .send_keyboard(chat, &format!("⏱ Uptime: <code>{up}</code>"), keyboards::back())
                .await?;
            Ok(())
        }
        "caption" => caption(state, chat, &arg).await,
        "hashtags" => hashtags(state, chat, &arg).await,
        "seo" => seo(state, chat, &arg).await,
        "stats" if operator => stats(state, chat).await,
        "ban" if operator => ban(state, chat, &arg).await,
        "unban" if operator => unban(state, chat, &arg).await,
        "broadcast" if operator => broadcast(state, profile, chat, &arg).await,
        "stats" | "ban" | "unban" | "broadcast" => {
            state.messenger.send_html(chat, "⛔ Admin only.").await?;
            Ok(())
        }
        _ => {
            state
                .messenger
                .send_html(chat, "🙂 Unknown command. Use /start or /help")
                .await?;
            Ok(())
        }
    }
}

async fn start(state: &AppState, chat: ChatId, operator: bool) -> Result<()> {
    let menu = texts::menu_text(&state.cfg);
    let kb = keyboards::main_menu(&state.cfg, operator);

    if let Some(image) = &state.cfg.start_image_url {
        if state
            .messenger
            .send_photo(chat, image, &menu, kb.clone())
            .await
            .is_ok()
        {
            return Ok(());
        }
        // Image unreachable: fall back to plain text menu.
    }

    state.messenger.send_keyboard(chat, &menu, kb).await?;
    Ok(())
}

async fn info(
    state: &AppState,
    profile: &RecipientProfile,
    chat: ChatId,
    operator: bool,
) -> Result<()> {
    let handle = profile.handle.as_deref().unwrap_or("N/A");
    let text = format!(
        "🧾 <b>Info</b>\n\
• Name: {}\n\
• Username: @{}\n\
• User ID: <code>{}</code>\n\
• Chat ID: <code>{}</code>\n\
• Admin: <code>{}</code>",
        escape_html(&profile.display_name),
        escape_html(handle),
        profile.id.0,
        chat.0,
        operator
    );
    state
        .messenger
        .send_keyboard(chat, &text, keyboards::back())
        .await?;
    Ok(())
}

async fn ping(state: &AppState, chat: ChatId) -> Result<()> {
    let t0 = Instant::now();
    let msg = state.messenger.send_html(chat, "🏓 Pinging...").await?;
    let ms = t0.elapsed().as_millis();
    state
        .messenger
        .edit_html(msg, &format!("🏓 Pong! <code>{ms}ms</code>"))
        .await?;
    Ok(())
}

async fn stats(state: &AppState, chat: ChatId) -> Result<()> {
    let users = state.db.count_all()?;
    let banned = state.db.count_banned()?;
    let up = format_duration(state.started_at.elapsed().as_secs());

    let text = format!(
        "📊 <b>Stats</b>\n\
• Users: <code>{users}</code>\n\
• Banned: <code>{banned}</code>\n\
• Uptime: <code>{up}</code>"
    );
    state
        .messenger
        .send_keyboard(chat, &text, keyboards::back())
        .await?;
    Ok(())
}

async fn ban(state: &AppState, chat: ChatId, arg: &str) -> Result<()> {
    let mut parts = arg.splitn(2, char::is_whitespace);
    let Some(id) = parts.next().and_then(|s| s.parse::<i64>().ok()) else {
        state
            .messenger
            .send_html(chat, "Use: /ban &lt;user_id&gt; [reason]")
            .await?;
        return Ok(());
    };
    let reason = parts.next().map(str::trim).filter(|s| !s.is_empty());
    let reason = reason.unwrap_or("No reason");

    state.db.ban(UserId(id), reason, Utc::now().timestamp())?;
    state
        .messenger
        .send_html(
            chat,
            &format!(
                "✅ Banned <code>{id}</code>\nReason: {}",
                escape_html(reason)
            ),
        )
        .await?;

    // Notify the banned user; their chat may be unreachable.
    let _ = state
        .messenger
        .send_html(
            ChatId(id),
            &format!("⛔ You are banned.\nReason: {}", escape_html(reason)),
        )
        .await;
    Ok(())
}

async fn unban(state: &AppState, chat: ChatId, arg: &str) -> Result<()> {
    let Ok(id) = arg.trim().parse::<i64>() else {
        state
            .messenger
            .send_html(chat, "Use: /unban &lt;user_id&gt;")
            .await?;
        return Ok(());
    };

    state.db.unban(UserId(id))?;
    state
        .messenger
        .send_html(chat, &format!("✅ Unbanned <code>{id}</code>"))
        .await?;

    let _ = state
        .messenger
        .send_html(ChatId(id), "✅ You are unbanned now.")
        .await;
    Ok(())
}

async fn broadcast(
    state: &AppState,
    profile: &RecipientProfile,
    chat: ChatId,
    arg: &str,
) -> Result<()> {
    let result = state
        .engine
        .broadcast(chat, profile.id, arg, state.messenger.clone())
        .await;

    match result {
        Ok(_) => Ok(()), // terminal status already delivered by the engine
        Err(BroadcastError::EmptyMessage) => {
            state
                .messenger
                .send_html(chat, "Use: /broadcast &lt;message&gt;")
                .await?;
            Ok(())
        }
        Err(BroadcastError::NoRecipients) => {
            state.messenger.send_html(chat, "No users found.").await?;
            Ok(())
        }
        Err(BroadcastError::Store(e)) => Err(e),
    }
}

async fn caption(state: &AppState, chat: ChatId, arg: &str) -> Result<()> {
    if arg.trim().is_empty() {
        state
            .messenger
            .send_html(
                chat,
                "Use: /caption &lt;topic&gt; [style]\nExample: /caption splendor bike viral",
            )
            .await?;
        return Ok(());
    }

    let (topic, style) = parse_caption_args(arg);
    if topic.is_empty() {
        state.messenger.send_html(chat, "❌ Topic missing.").await?;
        return Ok(());
    }

    let cap = state.content.caption(&topic, style);
    let out = format!(
        "🧠 <b>Caption ({})</b>\n{}",
        style.name(),
        escape_html(&cap)
    );
    state
        .messenger
        .send_keyboard(chat, &out, keyboards::seo_menu())
        .await?;
    Ok(())
}

async fn hashtags(state: &AppState, chat: ChatId, arg: &str) -> Result<()> {
    if arg.trim().is_empty() {
        state
            .messenger
            .send_html(
                chat,
                "Use: /hashtags &lt;topic&gt; [n=25] [lang=hinglish]\n\
Example: /hashtags bike reels 25 hinglish",
            )
            .await?;
        return Ok(());
    }

    let (topic, n, lang) = parse_hashtag_args(arg);
    if topic.is_empty() {
        state.messenger.send_html(chat, "❌ Topic missing.").await?;
        return Ok(());
    }

    let tags = state.content.hashtags(&topic, n, lang);
    let out = format!(
        "🏷 <b>Hashtags ({}, {})</b>\n{}",
        lang.name(),
        tags.len(),
        escape_html(&tags.join(" "))
    );
    state
        .messenger
        .send_keyboard(chat, &out, keyboards::seo_menu())
        .await?;
    Ok(())
}

async fn seo(state: &AppState, chat: ChatId, arg: &str) -> Result<()> {
    let topic = arg.trim();
    if topic.is_empty() {
        state
            .messenger
            .send_html(chat, "Use: /seo &lt;topic&gt;\nExample: /seo Dr Zeus song reels")
            .await?;
        return Ok(());
    }

    let pack = state.content.seo_pack(topic);
    let tips = pack
        .tips
        .iter()
        .map(|t| format!("• {}", escape_html(t)))
        .collect::<Vec<_>>()
        .join("\n");

    let out = format!(
        "🧠 <b>Caption</b>\n{}\n\n🏷 <b>Hashtags</b>\n{}\n\n📌 <b>Posting tips</b>\n{}",
        escape_html(&pack.caption),
        escape_html(&pack.hashtags.join(" ")),
        tips
    );
    state
        .messenger
        .send_keyboard(chat, &out, keyboards::seo_menu())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_parsing_handles_bot_suffix_and_case() {
        assert_eq!(
            parse_command("/Broadcast@MyBot hello world"),
            ("broadcast".to_string(), "hello world".to_string())
        );
        assert_eq!(parse_command("/ping"), ("ping".to_string(), String::new()));
    }

    #[test]
    fn caption_grammar_takes_trailing_style_keyword() {
        let (topic, style) = parse_caption_args("splendor bike viral");
        assert_eq!(topic, "splendor bike");
        assert_eq!(style, CaptionStyle::Viral);

        let (topic, style) = parse_caption_args("meri jaan love");
        assert_eq!(topic, "meri jaan");
        assert_eq!(style, CaptionStyle::Love);

        // Non-style trailing word stays part of the topic.
        let (topic, style) = parse_caption_args("city lights");
        assert_eq!(topic, "city lights");
        assert_eq!(style, CaptionStyle::Viral);
    }

    #[test]
    fn hashtag_grammar_takes_trailing_count_and_lang() {
        let (topic, n, lang) = parse_hashtag_args("bike reels 25 hinglish");
        assert_eq!(topic, "bike reels");
        assert_eq!(n, 25);
        assert_eq!(lang, TagLang::Hinglish);

        let (topic, n, lang) = parse_hashtag_args("dr zeus song 20 english");
        assert_eq!(topic, "dr zeus song");
        assert_eq!(n, 20);
        assert_eq!(lang, TagLang::English);

        let (topic, n, lang) = parse_hashtag_args("bike");
        assert_eq!(topic, "bike");
        assert_eq!(n, DEFAULT_HASHTAGS);
        assert_eq!(lang, TagLang::Hinglish);
    }

    #[test]
    fn hashtag_count_is_clamped() {
        let (_, n, _) = parse_hashtag_args("bike 5");
        assert_eq!(n, MIN_HASHTAGS);
        let (_, n, _) = parse_hashtag_args("bike 99");
        assert_eq!(n, MAX_HASHTAGS);
    }

    #[test]
    fn three_digit_trailing_number_is_topic_text() {
        let (topic, n, _) = parse_hashtag_args("route 666");
        assert_eq!(topic, "route 666");
        assert_eq!(n, DEFAULT_HASHTAGS);
    }
}
