//! User-facing strings.
//!
//! Hebrew is the default because the site the widget lives on is Hebrew.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorCategory};
use crate::normalize::Reply;
use crate::retry::RetryNotice;

/// Language of the user-facing strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "he")]
    Hebrew,
    #[serde(rename = "en")]
    English,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::Hebrew => "he",
            Locale::English => "en",
        }
    }

    pub fn catalog(&self) -> Catalog {
        Catalog { locale: *self }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "he" | "he-il" | "hebrew" => Ok(Locale::Hebrew),
            "en" | "en-us" | "en-gb" | "english" => Ok(Locale::English),
            _ => Err(Error::validation(
                format!("unsupported locale {s:?}; expected he or en"),
                Some("locale".to_string()),
            )),
        }
    }
}

/// The strings for one locale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Catalog {
    locale: Locale,
}

impl Catalog {
    /// Shown when the backend accepted a message with an empty body.
    pub fn acknowledgement(&self) -> &'static str {
        match self.locale {
            Locale::Hebrew => "הודעה נשלחה בהצלחה!",
            Locale::English => "Message sent successfully!",
        }
    }

    /// Shown when the response carried nothing displayable.
    pub fn still_working(&self) -> &'static str {
        match self.locale {
            Locale::Hebrew => "הבוט התחיל לעבוד! נסה לשלוח הודעה נוספת 🙂",
            Locale::English => "The bot has started working! Try sending another message 🙂",
        }
    }

    pub fn error_prefix(&self) -> &'static str {
        match self.locale {
            Locale::Hebrew => "שגיאה",
            Locale::English => "Error",
        }
    }

    /// Renders a normalized reply as bubble text.
    pub fn reply(&self, reply: &Reply) -> String {
        match reply {
            Reply::Text(text) => text.clone(),
            Reply::Error(err) => format!("{}: {err}", self.error_prefix()),
            Reply::Acknowledged => self.acknowledgement().to_string(),
            Reply::StillWorking => self.still_working().to_string(),
        }
    }

    pub fn retry_notice(&self, notice: &RetryNotice) -> String {
        match self.locale {
            Locale::Hebrew => format!(
                "מנסה להתחבר שוב... (ניסיון {}/{})",
                notice.attempt, notice.max_attempts
            ),
            Locale::English => format!(
                "Reconnecting... (attempt {}/{})",
                notice.attempt, notice.max_attempts
            ),
        }
    }

    /// The apology shown for a failed submission.
    pub fn failure(&self, category: ErrorCategory) -> &'static str {
        match (self.locale, category) {
            (Locale::Hebrew, ErrorCategory::NetworkError) => {
                "בעיה ברשת או חסימה מתוסף דפדפן. נסה לכבות תוספי פרטיות או רענן את הדף 🔄"
            }
            (Locale::Hebrew, ErrorCategory::Timeout) => {
                "החיבור לקח יותר מדי זמן. נסה שוב או בדוק את החיבור לאינטרנט ⏱️"
            }
            (Locale::Hebrew, ErrorCategory::NotFound) => {
                "הצ'אט כרגע לא פעיל. אנא פנה אלינו בדרך אחרת או נסה מאוחר יותר 🙏"
            }
            (Locale::Hebrew, ErrorCategory::GatewayUnavailable) => {
                "השרת זמנית לא זמין. נסה שוב בעוד כמה רגעים 🔧"
            }
            (Locale::Hebrew, ErrorCategory::Cors) => "בעיית אבטחה בדפדפן. אנא רענן את הדף ונסה שוב 🔄",
            (Locale::Hebrew, ErrorCategory::Generic) => "מצטער, יש בעיה טכנית. נסה שוב בעוד רגע 🙏",
            (Locale::English, ErrorCategory::NetworkError) => {
                "Network problem or a blocking extension. Try disabling privacy add-ons or reload 🔄"
            }
            (Locale::English, ErrorCategory::Timeout) => {
                "The connection took too long. Try again or check your internet connection ⏱️"
            }
            (Locale::English, ErrorCategory::NotFound) => {
                "The chat is not active right now. Please reach us another way or try later 🙏"
            }
            (Locale::English, ErrorCategory::GatewayUnavailable) => {
                "The server is temporarily unavailable. Try again in a few moments 🔧"
            }
            (Locale::English, ErrorCategory::Cors) => {
                "A browser security check failed. Please reload and try again 🔄"
            }
            (Locale::English, ErrorCategory::Generic) => {
                "Sorry, something went wrong. Please try again in a moment 🙏"
            }
        }
    }

    /// Names the things suspected of interfering with the connection.
    pub fn interference(&self, suspects: &[String]) -> String {
        let list = suspects.join(", ");
        match self.locale {
            Locale::Hebrew => {
                format!("זוהו תוספי דפדפן שעלולים לחסום: {list}. נסה לכבות אותם זמנית.")
            }
            Locale::English => {
                format!("Detected settings that may block the chat: {list}. Try disabling them temporarily.")
            }
        }
    }

    /// Shown when the optional greeting could not be delivered.
    pub fn welcome(&self) -> &'static str {
        match self.locale {
            Locale::Hebrew => "היי! איך אפשר לעזור? 😊",
            Locale::English => "Hi! How can I help? 😊",
        }
    }
}
