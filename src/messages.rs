//! Daily messages shown above the task overview.

use chrono::{Datelike, NaiveDate};

/// A short message with its emoji.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub text: &'static str,
    pub emoji: &'static str,
}

impl Message {
    const fn new(text: &'static str, emoji: &'static str) -> Self {
        Message { text, emoji }
    }
}

pub const MOTIVATIONAL_MESSAGES: &[Message] = &[
    Message::new("Alles erledigt! Zeit für eine wohlverdiente Pause!", "🌟"),
    Message::new("Wow, du bist heute super organisiert! Gönn dir was!", "✨"),
    Message::new("Mission accomplished! Du rockst das!", "💪"),
    Message::new("Keine Aufgaben? Das nenn ich mal Effizienz!", "🌈"),
    Message::new("Heute läuft's rund! Zeit zum Chillen!", "😎"),
    Message::new("Du bist der Boss! Alles im Griff!", "🌟"),
    Message::new("Hausaufgaben-Ninja Level erreicht!", "⚡"),
    Message::new("Heute ist dein Tag! Genieß ihn!", "🎈"),
    Message::new("Perfekt! Zeit für Videospiele!", "🎯"),
    Message::new("Hausaufgaben-Superheld:in des Tages!", "💫"),
];

pub const WARNING_MESSAGES: &[Message] = &[
    Message::new("ACHTUNG! Die Hausaufgaben-Polizei ist unterwegs!", "👮"),
    Message::new("Tick Tack... Die Uhr läuft! Keine Ausreden mehr!", "💀"),
    Message::new("Houston, wir haben ein Problem! Aufgaben in T-minus JETZT!", "🚀"),
    Message::new("Die Hausaufgaben-Krake wartet nicht ewig!", "🌊"),
    Message::new("BREAKING NEWS: Schüler:in noch nicht mit Hausaufgaben fertig!", "📺"),
    Message::new("Die Deadline-Ninjas sind in Position! Besser schnell sein!", "🥷"),
    Message::new("WARNUNG: Explodierende Hausaufgaben in 3... 2... 1...", "💣"),
    Message::new("Der Aufgaben-Yeti ist hungrig... und du hast sein Essen!", "❄️"),
];

/// Pick the message of the day: a warning while work is open, praise otherwise.
pub fn daily_message(today: NaiveDate, has_open_tasks: bool) -> Message {
    let pool = if has_open_tasks {
        WARNING_MESSAGES
    } else {
        MOTIVATIONAL_MESSAGES
    };
    pool[today.ordinal0() as usize % pool.len()]
}
