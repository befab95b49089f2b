//! Static menu/help copy, rendered as Telegram HTML.

use reachbot_core::{config::Config, formatting::escape_html};

pub fn menu_text(cfg: &Config) -> String {
    format!(
        "✨ <b>Welcome to {}</b>\n\n\
Choose an option below 👇\n\
Instagram SEO, Captions, Hashtags, Admin tools, Broadcast ✅",
        escape_html(&cfg.bot_name)
    )
}

pub fn help_text(cfg: &Config) -> String {
    format!(
        "🤖 <b>{}</b> Commands\n\n\
🧩 Basic:\n\
• /start - Menu + Image\n\
• /help - Commands\n\
• /info - Your info\n\
• /ping - Latency\n\
• /uptime - Bot uptime\n\n\
📈 SEO Tools (Instagram):\n\
• /caption &lt;topic&gt; [style]\n\
   styles: viral | aesthetic | attitude | love | sad | business | hindi | english\n\
• /hashtags &lt;topic&gt; [n=25] [lang=hinglish]\n\
• /seo &lt;topic&gt; - caption + hashtags + tips\n\n\
👑 Admin:\n\
• /stats - bot stats\n\
• /ban &lt;user_id&gt; [reason]\n\
• /unban &lt;user_id&gt;\n\
• /broadcast &lt;message&gt;",
        escape_html(&cfg.bot_name)
    )
}

pub fn rules_text() -> String {
    "📌 <b>Rules</b>\n\
• No spam / flood\n\
• No abuse\n\
• Misuse can get you banned"
        .to_string()
}

pub fn about_text(cfg: &Config) -> String {
    format!(
        "ℹ️ <b>About {}</b>\n\
• Fast &amp; clean bot\n\
• SEO tools + Admin controls\n\n\
Brand: {}",
        escape_html(&cfg.bot_name),
        escape_html(&cfg.brand_tag)
    )
}

pub fn seo_menu_text() -> String {
    "📈 <b>Instagram SEO Menu</b>\nChoose tool 👇".to_string()
}

pub fn caption_help_text() -> String {
    "🧠 <b>Caption Generator</b>\n\
Use:\n\
<code>/caption &lt;topic&gt; [style]</code>\n\n\
Example:\n\
<code>/caption splendor bike viral</code>\n\
<code>/caption meri jaan love</code>"
        .to_string()
}

pub fn hashtag_help_text() -> String {
    "🏷 <b>Hashtag Generator</b>\n\
Use:\n\
<code>/hashtags &lt;topic&gt; [n=25] [lang=hinglish]</code>\n\n\
Example:\n\
<code>/hashtags bike reels 25 hinglish</code>\n\
<code>/hashtags dr zeus song 20 english</code>"
        .to_string()
}

pub fn seo_help_text() -> String {
    "🚀 <b>Full SEO Pack</b>\n\
Use:\n\
<code>/seo &lt;topic&gt;</code>\n\n\
Example:\n\
<code>/seo capcut editing reels</code>"
        .to_string()
}

pub fn ban_help_text() -> String {
    "🛑 <b>Ban</b>\nUse:\n<code>/ban &lt;user_id&gt; [reason]</code>\n\
Example:\n<code>/ban 123456 spam</code>"
        .to_string()
}

pub fn unban_help_text() -> String {
    "✅ <b>Unban</b>\nUse:\n<code>/unban &lt;user_id&gt;</code>\n\
Example:\n<code>/unban 123456</code>"
        .to_string()
}

pub fn broadcast_help_text() -> String {
    "📣 <b>Broadcast</b>\nUse:\n<code>/broadcast &lt;message&gt;</code>\n\n\
⚠️ Tip: keep it short, don't spam."
        .to_string()
}
