use crate::{
    data::{photo::NewPhoto, student::StudentFields},
    error::{
        InvalidRollNumberSnafu, MultipartSnafu, RejectedFormSnafu, RejectedMultipartSnafu,
        RollcallError, RollcallResult,
    },
};
use axum::{
    Form,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use serde::Deserialize;
use snafu::ResultExt;

/// The multipart field carrying the photo.
pub const IMAGE_FIELD: &str = "image";

pub fn parse_roll_number(raw: &str) -> RollcallResult<i64> {
    raw.trim()
        .parse()
        .context(InvalidRollNumberSnafu { original: raw })
}

/// A create/update body, either `multipart/form-data` (with an optional photo) or urlencoded.
#[derive(Debug, Default)]
pub struct StudentSubmission {
    pub roll_number: Option<String>,
    pub fields: StudentFields,
    pub photo: Option<NewPhoto>,
}

impl StudentSubmission {
    /// A blank roll number means "let the database pick one".
    pub fn roll_number(&self) -> RollcallResult<Option<i64>> {
        self.roll_number
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(parse_roll_number)
            .transpose()
    }

    fn set_text(&mut self, name: &str, value: String) {
        let slot = match name {
            "roll_number" => &mut self.roll_number,
            "first_name" => &mut self.fields.first_name,
            "last_name" => &mut self.fields.last_name,
            "email" => &mut self.fields.email,
            "phone_number" => &mut self.fields.phone_number,
            "address" => &mut self.fields.address,
            _ => {
                trace!(?name, "Ignoring unknown form field");
                return;
            }
        };
        *slot = Some(value);
    }
}

#[derive(Deserialize)]
struct UrlencodedSubmission {
    roll_number: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phone_number: Option<String>,
    address: Option<String>,
}

impl<S: Send + Sync> FromRequest<S> for StudentSubmission {
    type Rejection = RollcallError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(UrlencodedSubmission {
                roll_number,
                first_name,
                last_name,
                email,
                phone_number,
                address,
            }) = Form::from_request(req, state)
                .await
                .context(RejectedFormSnafu)?;

            return Ok(Self {
                roll_number,
                fields: StudentFields {
                    first_name,
                    last_name,
                    email,
                    phone_number,
                    address,
                },
                photo: None,
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .context(RejectedMultipartSnafu)?;

        let mut submission = Self::default();
        while let Some(field) = multipart.next_field().await.context(MultipartSnafu)? {
            let name = field.name().unwrap_or_default().to_string();
            if name == IMAGE_FIELD {
                let file_name = field.file_name().map(ToString::to_string);
                let bytes = field.bytes().await.context(MultipartSnafu)?;
                submission.photo = NewPhoto::from_part(file_name, bytes);
            } else {
                let value = field.text().await.context(MultipartSnafu)?;
                submission.set_text(&name, value);
            }
        }

        Ok(submission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http};

    const BOUNDARY: &str = "rollcall-boundary";

    fn multipart_request(body: String) -> Request {
        http::Request::builder()
            .method("POST")
            .uri("/add_student")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[test]
    fn roll_numbers_must_be_integers() {
        assert_eq!(parse_roll_number(" 12 ").unwrap(), 12);
        assert!(matches!(
            parse_roll_number("12a"),
            Err(RollcallError::InvalidRollNumber { .. })
        ));
    }

    #[test]
    fn blank_roll_numbers_are_absent() {
        let submission = StudentSubmission {
            roll_number: Some("  ".into()),
            ..StudentSubmission::default()
        };
        assert_eq!(submission.roll_number().unwrap(), None);
    }

    #[tokio::test]
    async fn urlencoded_bodies_have_no_photo() {
        let req = http::Request::builder()
            .method("POST")
            .uri("/add_student")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("first_name=Ada&phone_number=0555"))
            .unwrap();

        let submission = StudentSubmission::from_request(req, &()).await.unwrap();
        assert_eq!(submission.fields.first_name.as_deref(), Some("Ada"));
        assert_eq!(submission.fields.phone_number.as_deref(), Some("0555"));
        assert_eq!(submission.fields.email, None);
        assert!(submission.photo.is_none());
    }

    #[tokio::test]
    async fn multipart_bodies_carry_fields_and_photo() {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"first_name\"\r\n\r\nAda\r\n\
             --{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"ada.png\"\r\nContent-Type: image/png\r\n\r\npixels\r\n\
             --{BOUNDARY}--\r\n"
        );

        let submission = StudentSubmission::from_request(multipart_request(body), &())
            .await
            .unwrap();
        assert_eq!(submission.fields.first_name.as_deref(), Some("Ada"));
        let photo = submission.photo.unwrap();
        assert_eq!(photo.original_file_name.as_deref(), Some("ada.png"));
        assert_eq!(&photo.bytes[..], b"pixels");
    }

    #[tokio::test]
    async fn an_unchosen_file_is_no_photo() {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"\"\r\nContent-Type: application/octet-stream\r\n\r\n\r\n\
             --{BOUNDARY}--\r\n"
        );

        let submission = StudentSubmission::from_request(multipart_request(body), &())
            .await
            .unwrap();
        assert!(submission.photo.is_none());
    }
}
