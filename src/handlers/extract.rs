//! Body extractors whose rejections come back as `AppError::BadRequest`
//! with a JSON body, instead of axum's plain-text 4xx.

use axum::extract::FromRequest;

use crate::errors::AppError;

#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(AppError))]
pub struct Form<T>(pub T);

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);
