use crate::models::ListInvoicesFilter;
use serde::{Deserialize, Serialize};

/// Query parameters of `GET /api/invoices`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInvoicesParams {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub invoice_no: Option<String>,
    pub customer_name: Option<String>,
}

impl From<ListInvoicesParams> for ListInvoicesFilter {
    /// Empty values are treated as absent; the date range applies only when
    /// both bounds are given.
    fn from(params: ListInvoicesParams) -> Self {
        let present = |value: Option<String>| value.filter(|v| !v.is_empty());

        Self {
            date_range: present(params.from_date).zip(present(params.to_date)),
            invoice_no: present(params.invoice_no),
            customer_name: present(params.customer_name),
        }
    }
}

/// Query parameters of `GET /api/next-invoice`.
#[derive(Debug, Default, Deserialize)]
pub struct NextInvoiceParams {
    pub date: Option<String>,
}

/// Acknowledgement returned by the upsert.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SaveInvoiceResponse {
    pub ok: bool,
}
