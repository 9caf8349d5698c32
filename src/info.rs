use crate::refs::{ObjectReferences, RefType};
use chrono::{DateTime, Datelike, Local, Offset, TimeZone, Timelike};
use pdf_writer::{Date as PDate, Pdf, TextStr};

/// Document metadata written into the PDF's info dictionary
#[derive(Default, Debug, Clone)]
pub struct Info {
    pub title: Option<String>,
    pub subject: Option<String>,
    /// Comma separated, as Adobe Acrobat suggests
    pub keywords: Option<String>,
}

impl Info {
    /// Metadata describing a deck of `cards` flashcards
    pub fn for_deck(cards: usize) -> Info {
        Info {
            title: Some("Flashcards".to_string()),
            subject: Some(format!("{cards} vocabulary flashcards")),
            keywords: Some("flashcards, vocabulary, definitions".to_string()),
        }
    }

    pub fn title<S: ToString>(&mut self, title: S) -> &mut Self {
        self.title = Some(title.to_string());
        self
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, writer: &mut Pdf) {
        let id = refs.gen(RefType::Info);
        let mut info = writer.document_info(id);

        if let Some(title) = &self.title {
            info.title(TextStr(title.as_str()));
        }
        if let Some(subject) = &self.subject {
            info.subject(TextStr(subject.as_str()));
        }
        if let Some(keywords) = &self.keywords {
            info.keywords(TextStr(keywords.as_str()));
        }
        info.creator(TextStr(concat!(
            env!("CARGO_PKG_NAME"),
            " v",
            env!("CARGO_PKG_VERSION")
        )));
        info.creation_date(pdf_date(&Local::now()));
    }
}

fn pdf_date<Tz: TimeZone>(now: &DateTime<Tz>) -> PDate {
    let offset = now.offset().fix().local_minus_utc();
    let offset_hours = offset / (60 * 60);
    let offset_minutes = ((offset - offset_hours * 60 * 60) / 60).abs();
    PDate::new(now.year() as u16)
        .month(now.month() as u8)
        .day(now.day() as u8)
        .hour(now.hour() as u8)
        .minute(now.minute() as u8)
        .second(now.second() as u8)
        .utc_offset_hour(offset_hours as i8)
        .utc_offset_minute(offset_minutes as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn deck_metadata_counts_cards() {
        let info = Info::for_deck(12);
        assert_eq!(info.title.as_deref(), Some("Flashcards"));
        assert_eq!(info.subject.as_deref(), Some("12 vocabulary flashcards"));
    }

    #[test]
    fn date_carries_negative_offsets() {
        let tz = FixedOffset::west_opt(6 * 3600 + 30 * 60).unwrap();
        let now = tz.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        let expected = PDate::new(2024)
            .month(3)
            .day(9)
            .hour(14)
            .minute(5)
            .second(0)
            .utc_offset_hour(-6)
            .utc_offset_minute(30);
        assert_eq!(pdf_date(&now), expected);
    }
}
