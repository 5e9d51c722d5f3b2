//! Wire types exchanged with the record store and the identity provider.
//!
//! Column and label spellings follow the store's existing schema, so they are
//! kept verbatim through `serde` renames.
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod record {
    use super::*;

    /// Value of the `tipo` column.
    ///
    /// `Emprestimo` is a legacy label for loans; readers treat it as an
    /// expense.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub enum RecordType {
        #[serde(rename = "ENTRADA")]
        Entrada,
        #[serde(rename = "SAÍDA")]
        Saida,
        #[serde(rename = "EMPRÉSTIMO")]
        Emprestimo,
    }

    /// Value of the `modalidade` column.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub enum RecordModality {
        #[serde(rename = "CRÉDITO")]
        Credito,
        #[serde(rename = "DÉBITO")]
        Debito,
        #[serde(rename = "EMPRÉSTIMO")]
        Emprestimo,
    }

    /// Value of the `pessoa` column, the owner partition key.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum RecordOwner {
        Bruno,
        Fernanda,
    }

    impl RecordOwner {
        /// Label used in `pessoa=eq.<label>` filters.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Bruno => "BRUNO",
                Self::Fernanda => "FERNANDA",
            }
        }
    }

    /// A row as returned by the store.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Record {
        pub id: i64,
        pub created_at: Option<DateTime<FixedOffset>>,
        #[serde(rename = "nome")]
        pub name: Option<String>,
        #[serde(rename = "tipo")]
        pub kind: RecordType,
        #[serde(rename = "valor")]
        pub amount: f64,
        /// `YYYY/MM`, kept for the store's own indexes; readers derive it from
        /// `date`.
        #[serde(rename = "competência")]
        pub competence: Option<String>,
        #[serde(rename = "data")]
        pub date: NaiveDate,
        #[serde(rename = "local", default)]
        pub location: Option<String>,
        #[serde(rename = "descrição", default)]
        pub description: Option<String>,
        pub status: bool,
        #[serde(rename = "modalidade")]
        pub modality: RecordModality,
        #[serde(rename = "pessoa")]
        pub owner: RecordOwner,
        #[serde(rename = "recorrente", default)]
        pub recurring: bool,
        #[serde(rename = "parcela_atual", default)]
        pub installment_index: Option<u32>,
        #[serde(rename = "parcela_quantidades", default)]
        pub installment_count: Option<u32>,
    }

    /// Body of an insert (one element per row) or of a full-row update.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct RecordWrite {
        #[serde(rename = "nome")]
        pub name: String,
        #[serde(rename = "tipo")]
        pub kind: RecordType,
        #[serde(rename = "valor")]
        pub amount: f64,
        #[serde(rename = "competência")]
        pub competence: String,
        #[serde(rename = "data")]
        pub date: NaiveDate,
        #[serde(rename = "local")]
        pub location: String,
        #[serde(rename = "descrição")]
        pub description: String,
        pub status: bool,
        #[serde(rename = "modalidade")]
        pub modality: RecordModality,
        #[serde(rename = "pessoa")]
        pub owner: RecordOwner,
        #[serde(rename = "recorrente")]
        pub recurring: bool,
        #[serde(rename = "parcela_atual")]
        pub installment_index: Option<u32>,
        #[serde(rename = "parcela_quantidades")]
        pub installment_count: Option<u32>,
    }

    /// Body of the bulk settlement update: exactly `{"status": true}`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SettleRecords {
        pub status: bool,
    }

    /// Error body returned by the store.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct StoreError {
        pub message: String,
        pub code: Option<String>,
        pub details: Option<String>,
        pub hint: Option<String>,
    }
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Credentials {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RefreshGrant {
        pub refresh_token: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct AuthUser {
        pub id: Uuid,
        pub email: Option<String>,
    }

    /// Successful password or refresh-token grant.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct TokenResponse {
        pub access_token: String,
        pub refresh_token: String,
        pub token_type: String,
        /// Lifetime of `access_token`, in seconds.
        pub expires_in: i64,
        pub user: AuthUser,
    }

    /// Error body returned by the identity provider.
    ///
    /// Depending on the endpoint, the readable message is in `error_description`,
    /// `msg` or `message`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AuthError {
        pub error: Option<String>,
        pub error_description: Option<String>,
        pub msg: Option<String>,
        pub message: Option<String>,
    }

    impl AuthError {
        pub fn readable(&self) -> Option<&str> {
            self.error_description
                .as_deref()
                .or(self.msg.as_deref())
                .or(self.message.as_deref())
                .or(self.error.as_deref())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::record::*;

    #[test]
    fn record_reads_store_columns() {
        let json = r#"{
            "id": 42,
            "created_at": "2024-01-15T12:00:00.123+00:00",
            "nome": "Market",
            "tipo": "SAÍDA",
            "valor": 19.9,
            "competência": "2024/01",
            "data": "2024-01-15",
            "local": "Nubank",
            "descrição": null,
            "status": false,
            "modalidade": "CRÉDITO",
            "pessoa": "FERNANDA",
            "recorrente": true,
            "parcela_atual": 2,
            "parcela_quantidades": 10
        }"#;
        let row: Record = serde_json::from_str(json).unwrap();
        assert_eq!(row.id, 42);
        assert_eq!(row.kind, RecordType::Saida);
        assert_eq!(row.modality, RecordModality::Credito);
        assert_eq!(row.owner, RecordOwner::Fernanda);
        assert_eq!(row.description, None);
        assert_eq!(row.installment_index, Some(2));
        assert_eq!(row.installment_count, Some(10));
    }

    #[test]
    fn record_tolerates_missing_optional_columns() {
        let json = r#"{
            "id": 1, "created_at": null, "nome": "Loan", "tipo": "EMPRÉSTIMO",
            "valor": 100, "competência": null, "data": "2024-02-01",
            "status": true, "modalidade": "EMPRÉSTIMO", "pessoa": "BRUNO"
        }"#;
        let row: Record = serde_json::from_str(json).unwrap();
        assert_eq!(row.kind, RecordType::Emprestimo);
        assert!(!row.recurring);
        assert_eq!(row.installment_count, None);
    }

    #[test]
    fn settle_body_is_status_only() {
        let body = serde_json::to_string(&SettleRecords { status: true }).unwrap();
        assert_eq!(body, r#"{"status":true}"#);
    }
}
