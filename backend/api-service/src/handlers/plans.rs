//! Premium plan endpoints.

use crate::error::Result;
use crate::models::{NewPlan, PlanUpdate};
use crate::services::PlanService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0))]
    pub price_cents: i64,
    #[serde(default)]
    pub priority: i32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlanRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub price_cents: Option<i64>,
    pub priority: Option<i32>,
}

/// POST /api/v1/plans
pub async fn create_plan(
    plans: web::Data<PlanService>,
    body: web::Json<CreatePlanRequest>,
) -> Result<HttpResponse> {
    body.validate()?;

    let body = body.into_inner();
    let plan = plans
        .create(NewPlan {
            title: body.title,
            description: body.description,
            price_cents: body.price_cents,
            priority: body.priority,
        })
        .await?;

    Ok(HttpResponse::Created().json(plan))
}

/// GET /api/v1/plans
pub async fn list_plans(plans: web::Data<PlanService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(plans.list().await?))
}

/// GET /api/v1/plans/{id}
pub async fn get_plan(plans: web::Data<PlanService>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(plans.get(path.into_inner()).await?))
}

/// PUT /api/v1/plans/{id}
pub async fn update_plan(
    plans: web::Data<PlanService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePlanRequest>,
) -> Result<HttpResponse> {
    body.validate()?;

    let body = body.into_inner();
    let plan = plans
        .update(
            path.into_inner(),
            PlanUpdate {
                title: body.title,
                description: body.description,
                price_cents: body.price_cents,
                priority: body.priority,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(plan))
}

/// DELETE /api/v1/plans/{id}
pub async fn delete_plan(
    plans: web::Data<PlanService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    plans.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
