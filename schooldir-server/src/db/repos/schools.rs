//! School repository
//!
//! - list: newest first, no pagination
//! - update: image column only written when a new image is supplied
//! - update/delete: no existence check; zero affected rows is not an error

use sqlx::PgPool;

use crate::models::{NewSchool, School, SchoolUpdate};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// School repository
pub struct SchoolRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> SchoolRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All schools ordered by id, newest first.
    pub async fn list(&self) -> Result<Vec<School>, DbError> {
        let rows = sqlx::query_as::<_, School>(
            r#"
            SELECT id, name, address, city, state, contact_number, email, image,
                   created_at, updated_at
            FROM schools
            ORDER BY id DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Insert a school, returning the generated id.
    pub async fn create(&self, school: &NewSchool) -> Result<i32, DbError> {
        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO schools (name, address, city, state, contact_number, image, email)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&school.name)
        .bind(&school.address)
        .bind(&school.city)
        .bind(&school.state)
        .bind(&school.contact_number)
        .bind(&school.image)
        .bind(&school.email)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Replace a school's fields by id. Without a new image the stored one
    /// is left alone.
    ///
    /// Returns the number of rows touched (0 or 1).
    pub async fn update(&self, update: &SchoolUpdate) -> Result<u64, DbError> {
        let fields = &update.fields;

        let result = match &fields.image {
            Some(image) => {
                sqlx::query(
                    r#"
                    UPDATE schools
                    SET name = $1, address = $2, city = $3, state = $4,
                        contact_number = $5, image = $6, email = $7, updated_at = NOW()
                    WHERE id = $8
                    "#,
                )
                .bind(&fields.name)
                .bind(&fields.address)
                .bind(&fields.city)
                .bind(&fields.state)
                .bind(&fields.contact_number)
                .bind(image)
                .bind(&fields.email)
                .bind(update.id)
                .execute(self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    UPDATE schools
                    SET name = $1, address = $2, city = $3, state = $4,
                        contact_number = $5, email = $6, updated_at = NOW()
                    WHERE id = $7
                    "#,
                )
                .bind(&fields.name)
                .bind(&fields.address)
                .bind(&fields.city)
                .bind(&fields.state)
                .bind(&fields.contact_number)
                .bind(&fields.email)
                .bind(update.id)
                .execute(self.pool)
                .await?
            }
        };

        Ok(result.rows_affected())
    }

    /// Delete a school by id. Returns the number of rows removed (0 or 1).
    pub async fn delete(&self, id: i32) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM schools WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, schema};
    use crate::models::{SchoolId, SchoolPayload};
    use crate::settings::DatabaseSettings;

    // Integration tests - run with DATABASE_URL set
    // cargo test -p schooldir-server -- --ignored --test-threads=1

    async fn test_pool() -> PgPool {
        let pool = create_pool(&DatabaseSettings::from_env())
            .await
            .expect("pool creation failed");
        schema::ensure_schools_table(&pool)
            .await
            .expect("schema creation failed");
        pool
    }

    fn payload(name: &str) -> SchoolPayload {
        SchoolPayload {
            id: None,
            name: Some(name.into()),
            address: Some("1 Main St".into()),
            city: Some("Springfield".into()),
            state: Some("IL".into()),
            contact_number: Some("5551234567".into()),
            email: Some("info@lincoln.edu".into()),
            image: Some("https://img.example/original.png".into()),
        }
    }

    fn find(rows: &[School], id: i32) -> Option<&School> {
        rows.iter().find(|s| s.id == id)
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_then_list_round_trip() {
        let pool = test_pool().await;
        let repo = SchoolRepo::new(&pool);

        let before = repo.list().await.unwrap().len();
        let new = NewSchool::from_payload(payload("Round Trip High")).unwrap();
        let id = repo.create(&new).await.unwrap();

        let rows = repo.list().await.unwrap();
        assert_eq!(rows.len(), before + 1);

        let row = find(&rows, id).expect("inserted row missing");
        assert_eq!(row.name, new.name);
        assert_eq!(row.address, new.address);
        assert_eq!(row.city.as_deref(), Some(new.city.as_str()));
        assert_eq!(row.state.as_deref(), Some(new.state.as_str()));
        assert_eq!(row.contact_number, new.contact_number);
        assert_eq!(row.email, new.email);
        assert_eq!(row.image, new.image);

        repo.delete(id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn list_is_newest_first() {
        let pool = test_pool().await;
        let repo = SchoolRepo::new(&pool);

        let first = repo
            .create(&NewSchool::from_payload(payload("Older")).unwrap())
            .await
            .unwrap();
        let second = repo
            .create(&NewSchool::from_payload(payload("Newer")).unwrap())
            .await
            .unwrap();

        let rows = repo.list().await.unwrap();
        let ids: Vec<i32> = rows.iter().map(|s| s.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(ids, sorted);
        assert!(second > first);

        repo.delete(first).await.unwrap();
        repo.delete(second).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn update_without_image_keeps_stored_image() {
        let pool = test_pool().await;
        let repo = SchoolRepo::new(&pool);
        let id = repo
            .create(&NewSchool::from_payload(payload("Keep Image")).unwrap())
            .await
            .unwrap();

        let mut edit = payload("Keep Image Renamed");
        edit.id = Some(SchoolId::Number(id as i64));
        edit.image = None;
        let affected = repo
            .update(&SchoolUpdate::from_payload(edit).unwrap())
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let rows = repo.list().await.unwrap();
        let row = find(&rows, id).unwrap();
        assert_eq!(row.name, "Keep Image Renamed");
        assert_eq!(row.image.as_deref(), Some("https://img.example/original.png"));
        assert!(row.updated_at >= row.created_at);

        let mut edit = payload("Keep Image Renamed");
        edit.id = Some(SchoolId::Number(id as i64));
        edit.image = Some("https://img.example/replacement.png".into());
        repo.update(&SchoolUpdate::from_payload(edit).unwrap())
            .await
            .unwrap();

        let rows = repo.list().await.unwrap();
        let row = find(&rows, id).unwrap();
        assert_eq!(row.image.as_deref(), Some("https://img.example/replacement.png"));

        repo.delete(id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn delete_removes_exactly_one_row() {
        let pool = test_pool().await;
        let repo = SchoolRepo::new(&pool);
        let keep = repo
            .create(&NewSchool::from_payload(payload("Keep")).unwrap())
            .await
            .unwrap();
        let gone = repo
            .create(&NewSchool::from_payload(payload("Gone")).unwrap())
            .await
            .unwrap();

        assert_eq!(repo.delete(gone).await.unwrap(), 1);

        let rows = repo.list().await.unwrap();
        assert!(find(&rows, gone).is_none());
        assert!(find(&rows, keep).is_some());

        repo.delete(keep).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn missing_rows_are_silent() {
        let pool = test_pool().await;
        let repo = SchoolRepo::new(&pool);
        let before = repo.list().await.unwrap();

        assert_eq!(repo.delete(i32::MAX).await.unwrap(), 0);

        let mut edit = payload("Nobody");
        edit.id = Some(SchoolId::Number(i32::MAX as i64));
        let affected = repo
            .update(&SchoolUpdate::from_payload(edit).unwrap())
            .await
            .unwrap();
        assert_eq!(affected, 0);

        assert_eq!(repo.list().await.unwrap().len(), before.len());
    }
}
