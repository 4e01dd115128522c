use anyhow::Context;
use diesel_async::AsyncPgConnection;
use garde::Validate;
use serde::Deserialize;

use super::{
    Write,
    error::{self, Error},
    model::{funding_body::NewFundingBody, institute::NewInstitute},
};

/// Records every deployment should start out with. Writing them again is a
/// no-op, so this can run on every startup.
#[derive(Deserialize, Validate, Clone, Debug, Default)]
pub struct SeedData {
    #[serde(default)]
    #[garde(dive)]
    institutes: Vec<NewInstitute>,
    #[serde(default)]
    #[garde(dive)]
    funding_bodies: Vec<NewFundingBody>,
}

fn ignore_duplicate<T>(result: error::Result<T>) -> error::Result<()> {
    match result {
        Ok(_) | Err(Error::DuplicateRecord { .. }) => Ok(()),
        Err(err) => Err(err),
    }
}

impl SeedData {
    /// # Errors
    pub async fn write(self, db_conn: &mut AsyncPgConnection) -> anyhow::Result<()> {
        self.validate().context("invalid seed data")?;

        let Self {
            institutes,
            funding_bodies,
        } = self;

        for institute in institutes {
            let name = institute.name.clone();
            ignore_duplicate(institute.write(db_conn).await)
                .with_context(|| format!("failed to insert institute {name}"))?;
        }

        for funding_body in funding_bodies {
            let name = funding_body.name.clone();
            ignore_duplicate(funding_body.write(db_conn).await)
                .with_context(|| format!("failed to insert funding body {name}"))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::db::{
        FetchMany, Pagination,
        model::funding_body::FundingBody,
        test_util::{DbConnection, db_conn},
    };

    #[test]
    fn empty_seed_data() {
        let seed_data: SeedData = serde_json::from_value(json!({})).unwrap();
        assert!(seed_data.institutes.is_empty());
        assert!(seed_data.funding_bodies.is_empty());
    }

    #[test]
    fn invalid_seed_data() {
        let seed_data: SeedData =
            serde_json::from_value(json!({"funding_bodies": [{"name": ""}]})).unwrap();
        assert!(seed_data.validate().is_err());
    }

    #[rstest]
    #[awt]
    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn seed_data_is_idempotent(#[future] db_conn: DbConnection) {
        let mut db_conn = db_conn;

        let seed_data: SeedData = serde_json::from_value(json!({
            "funding_bodies": [{"name": "seed_data_is_idempotent"}]
        }))
        .unwrap();

        seed_data.clone().write(&mut db_conn).await.unwrap();
        seed_data.write(&mut db_conn).await.unwrap();

        let funding_bodies = FundingBody::fetch_many(&Pagination::default(), &mut db_conn)
            .await
            .unwrap();
        let n_matching = funding_bodies
            .iter()
            .filter(|f| f.name == "seed_data_is_idempotent")
            .count();
        assert_eq!(n_matching, 1);
    }
}
