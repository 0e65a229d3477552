use crate::{
    data::photo::{NewPhoto, UploadStore},
    error::{
        CommitTransactionSnafu, GetDatabaseConnectionSnafu, MigrateSnafu, ReadQuerySnafu,
        RollbackTransactionSnafu, RollcallResult, WriteQuerySnafu,
    },
};
use serde::Deserialize;
use snafu::ResultExt;
use sqlx::{FromRow, Pool, Sqlite, SqliteConnection, Transaction};

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Student {
    pub roll_number: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub student_pic: Option<String>,
}

/// Every non-identifier text column. Updates overwrite all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StudentFields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

impl StudentFields {
    ///blank form inputs are stored as NULL
    #[must_use]
    pub fn normalised(self) -> Self {
        let clean = |field: Option<String>| field.filter(|value| !value.trim().is_empty());
        Self {
            first_name: clean(self.first_name),
            last_name: clean(self.last_name),
            email: clean(self.email),
            phone_number: clean(self.phone_number),
            address: clean(self.address),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewStudent {
    pub roll_number: Option<i64>,
    pub fields: StudentFields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    /// Clamps to the first page; there is deliberately no upper clamp.
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    pub fn offset(self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

#[derive(Debug, Clone)]
pub struct StudentPage {
    pub students: Vec<Student>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_students: i64,
}

impl Student {
    pub async fn init_schema(pool: &Pool<Sqlite>) -> RollcallResult<()> {
        sqlx::migrate!().run(pool).await.context(MigrateSnafu)
    }

    pub async fn create(
        NewStudent {
            roll_number,
            fields,
        }: NewStudent,
        student_pic: Option<&str>,
        conn: &mut SqliteConnection,
    ) -> RollcallResult<i64> {
        let StudentFields {
            first_name,
            last_name,
            email,
            phone_number,
            address,
        } = fields.normalised();

        sqlx::query_scalar("INSERT INTO student (roll_number, first_name, last_name, email, phone_number, address, student_pic) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING roll_number")
            .bind(roll_number)
            .bind(first_name)
            .bind(last_name)
            .bind(email)
            .bind(phone_number)
            .bind(address)
            .bind(student_pic)
            .fetch_one(conn)
            .await
            .context(WriteQuerySnafu)
    }

    pub async fn list_page(
        request: PageRequest,
        conn: &mut SqliteConnection,
    ) -> RollcallResult<StudentPage> {
        let total_students: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM student")
            .fetch_one(&mut *conn)
            .await
            .context(ReadQuerySnafu)?;

        let students: Vec<Self> = sqlx::query_as("SELECT roll_number, first_name, last_name, email, phone_number, address, student_pic FROM student ORDER BY roll_number LIMIT ? OFFSET ?")
            .bind(request.page_size)
            .bind(request.offset())
            .fetch_all(&mut *conn)
            .await
            .context(ReadQuerySnafu)?;

        Ok(StudentPage {
            students,
            current_page: request.page,
            total_pages: (total_students + request.page_size - 1) / request.page_size,
            total_students,
        })
    }

    pub async fn get_by_roll_number(
        roll_number: i64,
        conn: &mut SqliteConnection,
    ) -> RollcallResult<Option<Self>> {
        sqlx::query_as("SELECT roll_number, first_name, last_name, email, phone_number, address, student_pic FROM student WHERE roll_number = ?")
            .bind(roll_number)
            .fetch_optional(conn)
            .await
            .context(ReadQuerySnafu)
    }

    ///same lookup as [`Student::get_by_roll_number`], reached from the search form
    pub async fn search_by_roll_number(
        roll_number: i64,
        conn: &mut SqliteConnection,
    ) -> RollcallResult<Option<Self>> {
        Self::get_by_roll_number(roll_number, conn).await
    }

    /// Overwrites every text field. `student_pic` is only replaced when a new one is given.
    ///
    /// Returns whether a row with that roll number existed.
    pub async fn update(
        roll_number: i64,
        fields: StudentFields,
        student_pic: Option<&str>,
        conn: &mut SqliteConnection,
    ) -> RollcallResult<bool> {
        let StudentFields {
            first_name,
            last_name,
            email,
            phone_number,
            address,
        } = fields.normalised();

        let result = sqlx::query("UPDATE student SET first_name = ?, last_name = ?, email = ?, phone_number = ?, address = ?, student_pic = COALESCE(?, student_pic) WHERE roll_number = ?")
            .bind(first_name)
            .bind(last_name)
            .bind(email)
            .bind(phone_number)
            .bind(address)
            .bind(student_pic)
            .bind(roll_number)
            .execute(conn)
            .await
            .context(WriteQuerySnafu)?;

        Ok(result.rows_affected() > 0)
    }

    /// `None` if nothing matched, otherwise the removed row's picture (if any).
    pub async fn delete_by_roll_number(
        roll_number: i64,
        conn: &mut SqliteConnection,
    ) -> RollcallResult<Option<Option<String>>> {
        sqlx::query_scalar("DELETE FROM student WHERE roll_number = ? RETURNING student_pic")
            .bind(roll_number)
            .fetch_optional(conn)
            .await
            .context(WriteQuerySnafu)
    }
}

/// Opens a transaction already holding the write lock, so reading before writing inside it
/// waits on other writers instead of failing with `SQLITE_BUSY`.
async fn begin_write(pool: &Pool<Sqlite>) -> RollcallResult<Transaction<'static, Sqlite>> {
    pool.begin_with("BEGIN IMMEDIATE")
        .await
        .context(GetDatabaseConnectionSnafu)
}

/// Record-then-file, all inside one transaction: a failed file write rolls the row back,
/// and a failed commit removes the file again.
impl Student {
    pub async fn create_with_photo(
        new_student: NewStudent,
        photo: Option<NewPhoto>,
        pool: &Pool<Sqlite>,
        uploads: &UploadStore,
    ) -> RollcallResult<i64> {
        let file_name = photo.as_ref().map(UploadStore::generate_file_name);
        let mut transaction = begin_write(pool).await?;

        let roll_number =
            Self::create(new_student, file_name.as_deref(), &mut transaction).await?;

        if let (Some(photo), Some(file_name)) = (&photo, &file_name) {
            if let Err(e) = uploads.write(file_name, &photo.bytes).await {
                error!(?e, "Error storing photo, rolling back");
                transaction
                    .rollback()
                    .await
                    .context(RollbackTransactionSnafu)?;
                return Err(e);
            }
        }

        if let Err(e) = transaction.commit().await.context(CommitTransactionSnafu) {
            if let Some(file_name) = &file_name {
                uploads.remove(file_name).await;
            }
            return Err(e);
        }

        info!(?roll_number, ?file_name, "Added student");
        Ok(roll_number)
    }

    /// Returns `false` (and stores nothing) when the roll number doesn't exist.
    pub async fn update_with_photo(
        roll_number: i64,
        fields: StudentFields,
        photo: Option<NewPhoto>,
        pool: &Pool<Sqlite>,
        uploads: &UploadStore,
    ) -> RollcallResult<bool> {
        let file_name = photo.as_ref().map(UploadStore::generate_file_name);
        let mut transaction = begin_write(pool).await?;

        let Some(existing) = Self::get_by_roll_number(roll_number, &mut transaction).await? else {
            transaction
                .rollback()
                .await
                .context(RollbackTransactionSnafu)?;
            return Ok(false);
        };

        Self::update(roll_number, fields, file_name.as_deref(), &mut transaction).await?;

        if let (Some(photo), Some(file_name)) = (&photo, &file_name) {
            if let Err(e) = uploads.write(file_name, &photo.bytes).await {
                error!(?e, "Error storing photo, rolling back");
                transaction
                    .rollback()
                    .await
                    .context(RollbackTransactionSnafu)?;
                return Err(e);
            }
        }

        if let Err(e) = transaction.commit().await.context(CommitTransactionSnafu) {
            if let Some(file_name) = &file_name {
                uploads.remove(file_name).await;
            }
            return Err(e);
        }

        if file_name.is_some() {
            if let Some(old) = existing.student_pic {
                uploads.remove(&old).await;
            }
        }

        info!(?roll_number, ?file_name, "Updated student");
        Ok(true)
    }

    pub async fn delete_with_photo(
        roll_number: i64,
        pool: &Pool<Sqlite>,
        uploads: &UploadStore,
    ) -> RollcallResult<bool> {
        let mut conn = pool.acquire().await.context(GetDatabaseConnectionSnafu)?;

        match Self::delete_by_roll_number(roll_number, &mut conn).await? {
            Some(student_pic) => {
                if let Some(student_pic) = student_pic {
                    uploads.remove(&student_pic).await;
                }
                info!(?roll_number, "Deleted student");
                Ok(true)
            }
            None => {
                debug!(?roll_number, "Tried to delete missing student");
                Ok(false)
            }
        }
    }
}
