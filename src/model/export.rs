use csv::Writer;

use crate::model::credential::{Credential, CredentialId};

/// The voting link handed out for a credential.
pub fn voting_link(frontend_base_url: &str, id: &CredentialId) -> String {
    format!("{}/?token={}", frontend_base_url.trim_end_matches('/'), id)
}

/// Render credentials as CSV with columns `id,used,issuedAt,usedAt,link`.
/// Timestamps are milliseconds since the Unix epoch; `usedAt` is blank when unused.
pub fn credentials_csv(
    credentials: &[Credential],
    frontend_base_url: &str,
) -> Result<String, csv::Error> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(["id", "used", "issuedAt", "usedAt", "link"])?;
    for credential in credentials {
        writer.write_record([
            credential.id.to_string(),
            credential.used.to_string(),
            credential.issued_at.timestamp_millis().to_string(),
            credential
                .used_at
                .map(|t| t.timestamp_millis().to_string())
                .unwrap_or_default(),
            voting_link(frontend_base_url, &credential.id),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    // Every field written above is valid UTF-8.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn link_joins_cleanly() {
        let id = CredentialId::from("abc");
        assert_eq!(
            voting_link("https://vote.example.org/", &id),
            "https://vote.example.org/?token=abc"
        );
        assert_eq!(
            voting_link("https://vote.example.org", &id),
            "https://vote.example.org/?token=abc"
        );
    }

    #[test]
    fn csv_rows() {
        let issued = Utc.timestamp_millis_opt(1_000).unwrap();
        let used = Utc.timestamp_millis_opt(2_000).unwrap();
        let credentials = vec![
            Credential {
                id: "first".into(),
                used: false,
                issued_at: issued,
                used_at: None,
            },
            Credential {
                id: "second".into(),
                used: true,
                issued_at: issued,
                used_at: Some(used),
            },
        ];

        let csv = credentials_csv(&credentials, "https://v.example").unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "id,used,issuedAt,usedAt,link",
                "first,false,1000,,https://v.example/?token=first",
                "second,true,1000,2000,https://v.example/?token=second",
            ]
        );
    }
}
