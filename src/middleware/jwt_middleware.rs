/// Authentication gate
///
/// Runs once per request, before any handler. A missing bearer token marks
/// the request anonymous and lets it continue, so public routes still work;
/// handlers that extract `AuthContext` turn anonymity into a 401. A bearer
/// token that fails to decode short-circuits through the authorization entry
/// point. No cross-request state is touched: decode and verify are pure CPU
/// work on the handling path.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ResponseError,
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::{decode_access_token, AuthContext, SigningKeys};

pub struct JwtAuthentication {
    keys: SigningKeys,
}

impl JwtAuthentication {
    pub fn new(keys: SigningKeys) -> Self {
        Self { keys }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthenticationService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtAuthenticationService {
            service: Rc::new(service),
            keys: self.keys.clone(),
        }))
    }
}

pub struct JwtAuthenticationService<S> {
    service: Rc<S>,
    keys: SigningKeys,
}

impl<S, B> Service<ServiceRequest> for JwtAuthenticationService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let bearer = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string);

        let service = self.service.clone();

        match bearer {
            // Anonymous request: continue without a context. Protected
            // handlers answer 401 when they fail to extract one.
            None => Box::pin(async move {
                service.call(req).await.map(|res| res.map_into_left_body())
            }),
            Some(token) => match decode_access_token(&token, &self.keys) {
                Ok(claims) => {
                    let context = AuthContext::from_claims(claims);
                    tracing::debug!(
                        user_id = context.user().id,
                        email = %context.user().email,
                        "Access token validated"
                    );
                    req.extensions_mut().insert(context);

                    Box::pin(async move {
                        service.call(req).await.map(|res| res.map_into_left_body())
                    })
                }
                Err(e) => {
                    // Authorization entry point: uniform 401 body plus the
                    // bearer challenge header.
                    let response = e.error_response().map_into_right_body();
                    let (req, _) = req.into_parts();
                    Box::pin(async move { Ok(ServiceResponse::new(req, response)) })
                }
            },
        }
    }
}
