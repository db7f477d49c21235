use chrono::NaiveDate;

use crate::models::ReservationStatus;

pub const TITLE_CONFIRMED: &str = "Réservation confirmée";
pub const TITLE_CANCELLED: &str = "Réservation annulée";
pub const TITLE_PENDING: &str = "Réservation en attente";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub title: &'static str,
    pub message: String,
}

/// Wording for a reservation that just moved to `status`. Anything that is
/// neither confirmed nor cancelled reads as pending.
pub fn status_message(status: &ReservationStatus, date: &str, time: &str) -> StatusMessage {
    let when = format_date_time(date, time);
    match status {
        ReservationStatus::Confirmed => StatusMessage {
            title: TITLE_CONFIRMED,
            message: format!("Votre réservation du {when} a été confirmée."),
        },
        ReservationStatus::Cancelled => StatusMessage {
            title: TITLE_CANCELLED,
            message: format!("Votre réservation du {when} a été annulée."),
        },
        ReservationStatus::Pending | ReservationStatus::Other(_) => StatusMessage {
            title: TITLE_PENDING,
            message: format!("Votre réservation du {when} est en attente de confirmation."),
        },
    }
}

/// `2024-08-01` + `10:00` → `01/08/2024 à 10:00`. Dates that do not parse are
/// shown as received.
pub fn format_date_time(date: &str, time: &str) -> String {
    let date = date.trim();
    // full timestamps ("2024-08-01T00:00:00.000Z") keep only the date part
    let day = date.get(..10).unwrap_or(date);
    let shown = NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map(|parsed| parsed.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|_| date.to_string());

    let time = time.trim();
    if time.is_empty() {
        shown
    } else {
        format!("{shown} à {time}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmed_wording_includes_date_and_time() {
        let msg = status_message(&ReservationStatus::Confirmed, "2024-08-01", "10:00");
        assert_eq!(msg.title, "Réservation confirmée");
        assert_eq!(
            msg.message,
            "Votre réservation du 01/08/2024 à 10:00 a été confirmée."
        );
    }

    #[test]
    fn unknown_status_falls_back_to_pending() {
        let msg = status_message(
            &ReservationStatus::Other("reportee".into()),
            "2024-08-01",
            "",
        );
        assert_eq!(msg.title, TITLE_PENDING);
        assert_eq!(
            msg.message,
            "Votre réservation du 01/08/2024 est en attente de confirmation."
        );
    }

    #[test]
    fn dates_are_reformatted_when_possible() {
        assert_eq!(
            format_date_time("2024-12-24T00:00:00.000Z", "18:30"),
            "24/12/2024 à 18:30"
        );
        assert_eq!(format_date_time("demain", "9h"), "demain à 9h");
        assert_eq!(format_date_time("", ""), "");
    }
}
