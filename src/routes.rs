use crate::api::leave_request;
use actix_governor::{
    GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{Scope, web};
use anyhow::{Result, anyhow};

/// Per-peer limiter allowing `requests_per_min` with an equal burst.
pub fn rate_limiter(
    requests_per_min: u32,
) -> Result<GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        60_000 / requests_per_min as u64
    };

    GovernorConfigBuilder::default()
        .per_millisecond(per_ms.max(1))
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {} requests/min", requests_per_min))
}

/// All leave routes under `{api_prefix}/leave`.
///
/// Registration order matters: literal segments must come before the
/// `{id}` and `{status}` catch-alls that would otherwise shadow them.
pub fn leave_scope(api_prefix: &str) -> Scope {
    web::scope(&format!("{}/leave", api_prefix.trim_end_matches('/')))
        // /leave
        .service(web::resource("").route(web::get().to(leave_request::leave_list)))
        // /leave/submit
        .service(web::resource("/submit").route(web::post().to(leave_request::submit_leave)))
        // /leave/fileSize
        .service(web::resource("/fileSize").route(web::get().to(leave_request::file_size)))
        // /leave/approve/{id}
        .service(
            web::resource("/approve/{id}").route(web::put().to(leave_request::approve_leave)),
        )
        // /leave/update/{id}
        .service(web::resource("/update/{id}").route(web::put().to(leave_request::update_leave)))
        // /leave/delete/{id}
        .service(
            web::resource("/delete/{id}").route(web::delete().to(leave_request::delete_leave)),
        )
        // /leave/pending|approve|reject/employee/{employeeId}
        .service(
            web::resource("/pending/employee/{employee_id}")
                .route(web::get().to(leave_request::pending_for_employee)),
        )
        .service(
            web::resource("/approve/employee/{employee_id}")
                .route(web::get().to(leave_request::approved_for_employee)),
        )
        .service(
            web::resource("/reject/employee/{employee_id}")
                .route(web::get().to(leave_request::rejected_for_employee)),
        )
        // /leave/manager/{managerId}
        .service(
            web::resource("/manager/{manager_id}")
                .route(web::get().to(leave_request::leave_by_manager)),
        )
        // /leave/employee/{employeeId}
        .service(
            web::resource("/employee/{employee_id}")
                .route(web::get().to(leave_request::leave_by_employee)),
        )
        // /leave/{status}/manager/{managerId}
        .service(
            web::resource("/{status}/manager/{manager_id}")
                .route(web::get().to(leave_request::leave_by_manager_and_status)),
        )
        // /leave/reject/{id}/{leaveReason}
        .service(
            web::resource("/reject/{id}/{leave_reason}")
                .route(web::put().to(leave_request::reject_leave)),
        )
        // /leave/{id}
        .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
}
