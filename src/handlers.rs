//! HTCPCP route handlers.
//!
//! Every handler receives the pot store, the captured pot id and the request
//! headers, and always produces a response: domain refusals (teapot, empty
//! pot, decaf, unknown additions) are ordinary responses, not errors.

use serde_json::{json, Map, Value};

use crate::http::method::Method;
use crate::http::request::Headers;
use crate::http::response::Response;
use crate::observability::metrics;
use crate::pot::additions::{parse_additions, AdditionError};
use crate::pot::{
    BrewError, Pot, PotStatus, PotStore, WhenOutcome, ADDITION_CATALOG, DECAF_NOTICE,
};

pub const PROTOCOL: &str = "HTCPCP/1.0";

/// Request header carrying the wanted additions.
pub const ACCEPT_ADDITIONS: &str = "accept-additions";

/// Methods advertised by the registry listing.
const ADVERTISED_METHODS: [Method; 4] = [Method::Brew, Method::Get, Method::Propfind, Method::When];

/// Run `f` on the pot named `id`, or answer 404.
fn on_pot(store: &PotStore, id: Option<&str>, f: impl FnOnce(&mut Pot) -> Response) -> Response {
    let id = id.unwrap_or_default();
    store
        .with_pot(id, f)
        .unwrap_or_else(|| pot_not_found(store, id))
}

/// 404 for an id that names no pot, listing the ids that do.
pub fn pot_not_found(store: &PotStore, id: &str) -> Response {
    tracing::debug!(pot_id = id, "Pot not found");
    Response::json(
        404,
        json!({
            "error": "Not Found",
            "message": format!("No pot registered at coffee://{} or tea://{}", id, id),
            "pot_id": id,
            "registered_pots": store.ids(),
        }),
    )
}

/// 418 for a BREW aimed outside `/coffee/`.
pub fn wrong_universe(path: &str) -> Response {
    Response::json(
        418,
        json!({
            "error": "Wrong universe",
            "message": format!("BREW is not valid on {}", path),
            "hint": "BREW is only valid on coffee:// URIs",
            "rfc": "RFC 2324 §2.1",
        }),
    )
}

/// BREW (and POST) `/coffee/{id}`.
pub fn brew(store: &PotStore, id: Option<&str>, headers: &Headers) -> Response {
    let additions = parse_additions(headers.get(ACCEPT_ADDITIONS));

    on_pot(store, id, |pot| {
        let pot_id = pot.id().to_string();
        let outcome = pot
            .brew(additions)
            .map(|record| (record.id, record.additions.clone()));
        match outcome {
            Ok((brew_id, accepted)) => {
                let milk_pouring = pot.status() == PotStatus::PouringMilk;

                tracing::info!(
                    pot_id = %pot_id,
                    brew_id,
                    additions = ?accepted,
                    milk_pouring,
                    level = pot.level(),
                    status_code = 200,
                    "Coffee brewing"
                );
                metrics::record_brew(&pot_id);

                Response::json(
                    200,
                    json!({
                        "brew_id": brew_id,
                        "message": "Coffee is brewing.",
                        "pot": pot_id,
                        "accept-additions": accepted,
                        "milk_pouring": milk_pouring,
                        "when_required": milk_pouring,
                        "protocol": PROTOCOL,
                    }),
                )
            }
            Err(BrewError::Teapot) => {
                tracing::warn!(pot_id = %pot_id, status_code = 418, "Teapot asked to brew coffee");
                Response::json(
                    418,
                    json!({
                        "status": 418,
                        "error": "I'm a teapot",
                        "body": "The requested entity body is short and stout.",
                        "hint": "Tip me over and pour me out.",
                        "pot_id": pot_id,
                        "pot_type": pot.kind(),
                        "rfc": "RFC 2324 §2.3.2",
                        "suggestion": "Try coffee://pot-1 instead.",
                    }),
                )
            }
            Err(BrewError::Empty) => {
                tracing::warn!(pot_id = %pot_id, status_code = 503, "Pot empty");
                Response::json(
                    503,
                    json!({
                        "error": "Service Unavailable",
                        "message": "Pot is empty. Please refill before brewing.",
                        "note": "This is a 503, not a 418. The pot is a coffee pot, it is just empty.",
                    }),
                )
            }
            Err(BrewError::Additions(AdditionError::Decaf)) => {
                tracing::warn!(pot_id = %pot_id, status_code = 406, "Decaf refused");
                Response::json(
                    406,
                    json!({
                        "error": "Not Acceptable",
                        "message": "Decaffeinated coffee? What's the point?",
                        "rfc": "RFC 2324 §2.1.1",
                    }),
                )
            }
            Err(BrewError::Additions(AdditionError::Unsupported(unsupported))) => {
                tracing::info!(pot_id = %pot_id, ?unsupported, status_code = 406, "Unsupported additions");
                Response::json(
                    406,
                    json!({
                        "error": "Not Acceptable",
                        "unsupported_additions": unsupported,
                        "hint": format!("Use PROPFIND /coffee/{}/additions to list valid values.", pot_id),
                    }),
                )
            }
        }
    })
}

/// GET `/coffee/{id}/status`.
pub fn status(store: &PotStore, id: Option<&str>, _headers: &Headers) -> Response {
    on_pot(store, id, |pot| {
        tracing::info!(pot_id = pot.id(), status = %pot.status(), "Pot status");
        Response::json(200, json!(pot.summary()))
    })
}

/// GET `/coffee/{id}/history`.
pub fn history(store: &PotStore, id: Option<&str>, _headers: &Headers) -> Response {
    on_pot(store, id, |pot| {
        Response::json(
            200,
            json!({
                "pot_id": pot.id(),
                "total_brews": pot.history().len(),
                "brews": pot.history(),
            }),
        )
    })
}

/// PROPFIND `/coffee/{id}/additions`.
pub fn additions(store: &PotStore, id: Option<&str>, _headers: &Headers) -> Response {
    on_pot(store, id, |pot| {
        tracing::info!(pot_id = pot.id(), "Additions listed");

        let mut body = Map::new();
        for (key, values) in ADDITION_CATALOG {
            body.insert(key.to_string(), json!(values));
        }
        body.insert("decaf".into(), json!(DECAF_NOTICE));
        body.insert("rfc".into(), json!("RFC 2324 §2.1.1"));
        Response::json(200, Value::Object(body))
    })
}

/// WHEN `/coffee/{id}/stop-milk`.
pub fn stop_milk(store: &PotStore, id: Option<&str>, _headers: &Headers) -> Response {
    on_pot(store, id, |pot| match pot.stop_milk() {
        WhenOutcome::NotPouring(current) => {
            tracing::info!(pot_id = pot.id(), status = %current, "WHEN with no milk pouring");
            Response::json(
                200,
                json!({
                    "message": "WHEN acknowledged.",
                    "note": "No milk was being poured, but your enthusiasm is appreciated.",
                    "current_status": current,
                    "rfc": "RFC 2324 §2.1.3",
                }),
            )
        }
        WhenOutcome::Stopped => {
            tracing::info!(pot_id = pot.id(), status_code = 200, "Milk stopped");
            Response::json(
                200,
                json!({
                    "message": "Milk pouring stopped.",
                    "detail": "The server has acknowledged WHEN and stopped the milk stream.",
                    "current_status": pot.status(),
                    "protocol": PROTOCOL,
                    "rfc": "RFC 2324 §2.1.3",
                }),
            )
        }
    })
}

/// GET `/`: every pot keyed by URI.
pub fn registry(store: &PotStore, _id: Option<&str>, _headers: &Headers) -> Response {
    let mut pots = Map::new();
    for (uri, summary) in store.summaries() {
        pots.insert(uri, json!(summary));
    }

    Response::json(
        200,
        json!({
            "protocol": PROTOCOL,
            "rfc": ["RFC 2324", "RFC 7168"],
            "pots": pots,
            "methods": ADVERTISED_METHODS.iter().map(Method::as_str).collect::<Vec<_>>(),
            "supported_additions": ADDITION_CATALOG.iter().map(|(key, _)| *key).collect::<Vec<_>>(),
        }),
    )
}
