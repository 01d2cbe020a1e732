use crate::{
    api::{holiday, kra, leave_request, permissions},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

/// Per-IP limiter allowing `requests_per_min` with an equal burst.
pub fn build_limiter(requests_per_min: u32) -> Option<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = 60_000 / u64::from(requests_per_min);

    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms.max(1))
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()?;

    Some(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let leave = web::scope("/leave")
        // /leave
        .service(
            web::resource("")
                .route(web::get().to(leave_request::leave_list))
                .route(web::post().to(leave_request::create_leave)),
        )
        // /leave/deduction
        .service(
            web::resource("/deduction").route(web::post().to(leave_request::preview_deduction)),
        )
        // /leave/{id}
        .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
        // /leave/{id}/approve
        .service(
            web::resource("/{id}/approve").route(web::put().to(leave_request::approve_leave)),
        )
        // /leave/{id}/reject
        .service(
            web::resource("/{id}/reject").route(web::put().to(leave_request::reject_leave)),
        );

    let holidays = web::scope("/holidays")
        .service(
            web::resource("")
                .route(web::get().to(holiday::list_holidays))
                .route(web::post().to(holiday::create_holiday)),
        )
        .service(
            web::resource("/{id}")
                .route(web::put().to(holiday::update_holiday))
                .route(web::delete().to(holiday::delete_holiday)),
        );

    let kra = web::scope("/kra")
        .service(web::resource("/score").route(web::post().to(kra::score_kra)));

    let permissions = web::scope("/permissions")
        .service(web::resource("/me").route(web::get().to(permissions::my_permissions)))
        .service(web::resource("/check").route(web::get().to(permissions::check_permission)));

    let protected = web::scope(&config.api_prefix)
        .service(leave)
        .service(holidays)
        .service(kra)
        .service(permissions)
        .wrap(from_fn(auth_middleware)); // authentication

    match build_limiter(config.rate_protected_per_min) {
        // rate limiting runs before authentication
        Some(limiter) => cfg.service(protected.wrap(limiter)),
        None => {
            tracing::warn!("Rate limiter configuration rejected; protected routes are unthrottled");
            cfg.service(protected)
        }
    };
}
