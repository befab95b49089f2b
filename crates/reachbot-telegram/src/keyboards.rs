//! Inline keyboard layouts for the menu surface.

use reachbot_core::{
    config::Config,
    messaging::types::{InlineButton, InlineKeyboard},
};

pub fn main_menu(cfg: &Config, operator: bool) -> InlineKeyboard {
    let mut kb = InlineKeyboard::new(vec![
        vec![
            InlineButton::callback("📈 Instagram SEO", "seo_menu"),
            InlineButton::callback("🧩 Help", "help"),
        ],
        vec![
            InlineButton::callback("📌 Rules", "rules"),
            InlineButton::callback("ℹ️ About", "about"),
        ],
        vec![
            InlineButton::url("🆘 Support", &cfg.support_url),
            InlineButton::url("📣 Channel", &cfg.channel_url),
        ],
        vec![
            InlineButton::url("👑 Owner", &cfg.owner_url),
            InlineButton::callback("❌ Close", "close"),
        ],
        vec![
            InlineButton::url("📸 Instagram", &cfg.instagram_url),
            InlineButton::url("▶️ YouTube", &cfg.youtube_url),
        ],
        vec![
            InlineButton::url("📘 Facebook", &cfg.facebook_url),
            InlineButton::url("👻 Snapchat", &cfg.snapchat_url),
        ],
    ]);

    if operator {
        kb.rows.insert(
            1,
            vec![InlineButton::callback("📣 Broadcast", "admin_broadcast_help")],
        );
        kb.rows.insert(
            2,
            vec![InlineButton::callback("🛡 Admin Panel", "admin_panel")],
        );
    }

    kb
}

pub fn back() -> InlineKeyboard {
    InlineKeyboard::new(vec![vec![InlineButton::callback("⬅️ Back", "home")]])
}

pub fn seo_menu() -> InlineKeyboard {
    InlineKeyboard::new(vec![
        vec![InlineButton::callback("🧠 Caption Generator", "cap_help")],
        vec![InlineButton::callback("🏷 Hashtag Generator", "hash_help")],
        vec![InlineButton::callback("🚀 Full SEO Pack", "seo_help")],
        vec![InlineButton::callback("⬅️ Back", "home")],
    ])
}

pub fn admin_menu() -> InlineKeyboard {
    InlineKeyboard::new(vec![
        vec![InlineButton::callback("📊 Stats", "admin_stats")],
        vec![InlineButton::callback("🛑 Ban Help", "admin_ban_help")],
        vec![InlineButton::callback("✅ Unban Help", "admin_unban_help")],
        vec![InlineButton::callback("📣 Broadcast Help", "admin_broadcast_help")],
        vec![InlineButton::callback("⬅️ Back", "home")],
    ])
}
