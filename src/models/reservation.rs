use serde::{Deserialize, Serialize};

/// A booking as the backend returns it. Field names on the wire are the
/// backend's own; only `_id`, `statut`, `date` and `heure` are relied upon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Reservation {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "nom", default)]
    pub customer_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "telephone", default)]
    pub phone: String,
    #[serde(rename = "typeService", default)]
    pub service: String,
    #[serde(default)]
    pub date: String,
    #[serde(rename = "heure", default)]
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "statut", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Reservation {
    pub fn canonical_status(&self) -> ReservationStatus {
        ReservationStatus::parse(self.status.as_deref())
    }
}

/// Body of `POST /reservations`. The backend assigns id, status and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewReservation {
    #[serde(rename = "nom")]
    pub customer_name: String,
    pub email: String,
    #[serde(rename = "telephone")]
    pub phone: String,
    #[serde(rename = "typeService")]
    pub service: String,
    pub date: String,
    #[serde(rename = "heure")]
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Canonical reservation status. Every spelling the backend has been seen to
/// emit (with or without accents, French or English) folds into one variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    /// Unrecognized value, kept folded so two different unknown values still
    /// compare unequal.
    Other(String),
}

impl Default for ReservationStatus {
    fn default() -> Self {
        ReservationStatus::Pending
    }
}

impl ReservationStatus {
    /// A missing status means the booking has not been handled yet.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return ReservationStatus::Pending;
        };

        let folded = fold_status(raw);
        match folded.as_str() {
            "" | "en_attente" | "pending" => ReservationStatus::Pending,
            "confirme" | "confirmed" => ReservationStatus::Confirmed,
            "annule" | "cancelled" | "canceled" => ReservationStatus::Cancelled,
            _ => ReservationStatus::Other(folded),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ReservationStatus::Pending => "en_attente",
            ReservationStatus::Confirmed => "confirme",
            ReservationStatus::Cancelled => "annule",
            ReservationStatus::Other(value) => value.as_str(),
        }
    }

    /// Badge text shown next to a reservation.
    pub fn label(&self) -> &'static str {
        match self {
            ReservationStatus::Confirmed => "Confirmée",
            ReservationStatus::Cancelled => "Annulée",
            ReservationStatus::Pending | ReservationStatus::Other(_) => "En attente",
        }
    }
}

fn fold_status(raw: &str) -> String {
    raw.trim()
        .chars()
        .flat_map(char::to_lowercase)
        // combining marks left over from decomposed input ("e\u{301}")
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .map(|c| match c {
            'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' => 'i',
            'ô' | 'ö' => 'o',
            'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            ' ' | '-' => '_',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accented_and_plain_spellings_are_the_same_status() {
        assert_eq!(
            ReservationStatus::parse(Some("confirme")),
            ReservationStatus::parse(Some("confirmé"))
        );
        assert_eq!(
            ReservationStatus::parse(Some("annulé")),
            ReservationStatus::Cancelled
        );
        assert_eq!(
            ReservationStatus::parse(Some("Confirme\u{301}")),
            ReservationStatus::Confirmed
        );
        assert_eq!(
            ReservationStatus::parse(Some(" En attente ")),
            ReservationStatus::Pending
        );
    }

    #[test]
    fn missing_status_is_pending() {
        assert_eq!(ReservationStatus::parse(None), ReservationStatus::Pending);
        assert_eq!(ReservationStatus::parse(Some("")), ReservationStatus::Pending);
    }

    #[test]
    fn unknown_statuses_stay_distinct() {
        let a = ReservationStatus::parse(Some("reportée"));
        let b = ReservationStatus::parse(Some("terminée"));
        assert_ne!(a, b);
        assert_eq!(a.label(), "En attente");
        assert_eq!(a.as_str(), "reportee");
    }

    #[test]
    fn reservation_reads_backend_field_names() {
        let json = r#"{
            "_id": "r1",
            "nom": "Awa",
            "email": "client@example.com",
            "telephone": "0600000000",
            "typeService": "massage",
            "date": "2024-08-01",
            "heure": "10:00",
            "statut": "confirmé"
        }"#;
        let reservation: Reservation = serde_json::from_str(json).unwrap();
        assert_eq!(reservation.id.as_deref(), Some("r1"));
        assert_eq!(reservation.time, "10:00");
        assert_eq!(reservation.canonical_status(), ReservationStatus::Confirmed);
        assert!(reservation.message.is_none());
    }

    #[test]
    fn sparse_reservation_still_parses() {
        let reservation: Reservation =
            serde_json::from_str(r#"{"_id":"r2","date":"2024-08-02"}"#).unwrap();
        assert_eq!(reservation.canonical_status(), ReservationStatus::Pending);
        assert!(reservation.customer_name.is_empty());
    }
}
