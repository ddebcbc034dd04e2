pub mod progress;
pub mod request;
pub mod response;

pub use progress::{ImportProgress, ModelProgress};
pub use request::{ImportRecordRequest, ImportRequest};
pub use response::{ImportRecordResponse, ImportResponse};

use crate::usecases::common::UseCaseMetadata;

pub struct ImportFromSalesforce;

impl UseCaseMetadata for ImportFromSalesforce {
    fn usecase_index() -> &'static str {
        "u601"
    }

    fn usecase_name() -> &'static str {
        "import_from_salesforce"
    }

    fn display_name() -> &'static str {
        "Import from Salesforce"
    }

    fn description() -> &'static str {
        "Загрузка контрагентов, товаров, цен и выигранных сделок из Salesforce в ERP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usecase_full_name() {
        assert_eq!(
            ImportFromSalesforce::full_name(),
            "u601_import_from_salesforce"
        );
    }
}
