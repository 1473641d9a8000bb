use actix_web::web::{scope, ServiceConfig};
use actix_web::Scope;
use admin::{delete_user, export_users_csv, list_registered_users, update_user};
use payments::{create_order, verify_payment};
use users::{get_profile, login, register};

mod admin;
mod health_check;
mod payments;
mod users;

use crate::routes::health_check::*;

fn util_routes() -> Scope {
    scope("").service(health_check)
}

fn users_routes() -> Scope {
    scope("users")
        .service(register)
        .service(login)
        .service(get_profile)
}

fn payments_routes() -> Scope {
    scope("payments")
        .service(create_order)
        .service(verify_payment)
}

fn admin_routes() -> Scope {
    scope("admin")
        .service(export_users_csv)
        .service(list_registered_users)
        .service(update_user)
        .service(delete_user)
}

pub fn paintos_routes(conf: &mut ServiceConfig) {
    conf.service(
        scope("api/v1")
            .service(users_routes())
            .service(payments_routes())
            .service(admin_routes())
            .service(util_routes()),
    );
}
