//! Queries y mutations del schema GraphQL

use async_graphql::{Context, ErrorExtensions, InputObject, Object, Result, SimpleObject};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use validator::Validate;

use crate::dto::auto_dto::{AutoDto, AutoUpdateDto};
use crate::middleware::auth::{AuthenticatedUser, FORBIDDEN_RESOURCE, ROLE_ADMIN, ROLE_USER};
use crate::models::auto::{Auto, AutoArt};
use crate::services::auto_read_service::AutoReadService;
use crate::services::auto_write_service::{AutoWriteService, UpdateParams};
use crate::services::query_builder::{self, SearchParams};
use crate::utils::errors::AppError;

/// Criterios de búsqueda; los flags exigen el Schlagwort correspondiente
#[derive(Debug, Clone, Default, InputObject)]
#[graphql(name = "SuchparameterInput")]
pub struct Suchparameter {
    pub identifikations_nummer: Option<String>,
    pub fin: Option<String>,
    pub rating: Option<i32>,
    pub preis: Option<Decimal>,
    pub art: Option<AutoArt>,
    pub verfuegbar: Option<bool>,
    pub baujahr: Option<NaiveDate>,
    pub homepage: Option<String>,
    pub allrad: Option<bool>,
    pub sport: Option<bool>,
    pub suv: Option<bool>,
    pub familie: Option<bool>,
    pub e_auto: Option<bool>,
    pub vier_x_vier: Option<bool>,
    pub kombi: Option<bool>,
    pub cabrio: Option<bool>,
    pub limousine: Option<bool>,
    pub pickup: Option<bool>,
    pub crossover: Option<bool>,
    pub hybrid: Option<bool>,
    pub diesel: Option<bool>,
    pub benzin: Option<bool>,
    pub elektro: Option<bool>,
    pub automatik: Option<bool>,
    pub luxus: Option<bool>,
    pub kompakt: Option<bool>,
    pub oldtimer: Option<bool>,
}

impl Suchparameter {
    /// Mismo vocabulario que la query REST
    pub fn into_search_params(self) -> SearchParams {
        let mut params = SearchParams::new();
        let mut put = |name: &str, value: Option<String>| {
            if let Some(value) = value {
                params.insert(name.to_string(), value);
            }
        };

        put(query_builder::IDENTIFIKATIONS_NUMMER, self.identifikations_nummer);
        put(query_builder::FIN, self.fin);
        put(query_builder::RATING, self.rating.map(|r| r.to_string()));
        put(query_builder::PREIS, self.preis.map(|p| p.to_string()));
        put(query_builder::ART, self.art.map(|a| a.to_string()));
        put(query_builder::VERFUEGBAR, self.verfuegbar.map(|v| v.to_string()));
        put(
            query_builder::BAUJAHR,
            self.baujahr.map(|d| d.format("%Y-%m-%d").to_string()),
        );
        put(query_builder::HOMEPAGE, self.homepage);

        let flags = [
            ("allrad", self.allrad),
            ("sport", self.sport),
            ("suv", self.suv),
            ("familie", self.familie),
            ("e_auto", self.e_auto),
            ("vier_x_vier", self.vier_x_vier),
            ("kombi", self.kombi),
            ("cabrio", self.cabrio),
            ("limousine", self.limousine),
            ("pickup", self.pickup),
            ("crossover", self.crossover),
            ("hybrid", self.hybrid),
            ("diesel", self.diesel),
            ("benzin", self.benzin),
            ("elektro", self.elektro),
            ("automatik", self.automatik),
            ("luxus", self.luxus),
            ("kompakt", self.kompakt),
            ("oldtimer", self.oldtimer),
        ];
        for (flag, value) in flags {
            put(flag, value.map(|v| v.to_string()));
        }

        params
    }
}

/// Datos para modificar un auto existente
#[derive(Debug, Clone, InputObject)]
pub struct AutoUpdateInput {
    pub id: i32,
    pub version: i32,
    pub fin: String,
    pub rating: i32,
    pub art: Option<AutoArt>,
    pub preis: Decimal,
    pub rabatt: Option<Decimal>,
    #[graphql(default)]
    pub verfuegbar: bool,
    pub baujahr: Option<NaiveDate>,
    pub homepage: Option<String>,
    pub schlagwoerter: Option<Vec<String>>,
}

impl AutoUpdateInput {
    fn into_parts(self) -> (i32, i32, AutoUpdateDto) {
        let dto = AutoUpdateDto {
            fin: self.fin,
            rating: self.rating,
            art: self.art,
            preis: self.preis,
            rabatt: self.rabatt,
            verfuegbar: self.verfuegbar,
            baujahr: self.baujahr,
            homepage: self.homepage,
            schlagwoerter: self.schlagwoerter,
        };
        (self.id, self.version, dto)
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct CreatePayload {
    pub id: i32,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct UpdatePayload {
    pub version: i32,
}

// Sin usuario autenticado la respuesta es la misma que con un rol insuficiente
fn require_roles(ctx: &Context<'_>, roles: &[&str]) -> Result<(), AppError> {
    match ctx.data_opt::<AuthenticatedUser>() {
        Some(user) => user.require_any_role(roles),
        None => Err(AppError::Forbidden(FORBIDDEN_RESOURCE.to_string())),
    }
}

fn read_service<'a>(ctx: &Context<'a>) -> Result<&'a Arc<AutoReadService>> {
    ctx.data::<Arc<AutoReadService>>()
}

fn write_service<'a>(ctx: &Context<'a>) -> Result<&'a Arc<AutoWriteService>> {
    ctx.data::<Arc<AutoWriteService>>()
}

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Un auto por id, con sus Ausstattungen
    async fn auto(&self, ctx: &Context<'_>, id: i32) -> Result<Auto> {
        read_service(ctx)?
            .find_by_id(id, true)
            .await
            .map_err(|e| e.extend())
    }

    /// Todos los autos que cumplen los criterios, sin paginar
    async fn autos(
        &self,
        ctx: &Context<'_>,
        suchparameter: Option<Suchparameter>,
    ) -> Result<Vec<Auto>> {
        let params = suchparameter.map(Suchparameter::into_search_params);
        read_service(ctx)?
            .find_all(params.as_ref())
            .await
            .map_err(|e| e.extend())
    }
}

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create(&self, ctx: &Context<'_>, input: AutoDto) -> Result<CreatePayload> {
        require_roles(ctx, &[ROLE_ADMIN, ROLE_USER]).map_err(|e| e.extend())?;
        input
            .validate()
            .map_err(|e| AppError::from(e).extend())?;

        let id = write_service(ctx)?
            .create(input.into())
            .await
            .map_err(|e| e.extend())?;
        Ok(CreatePayload { id })
    }

    async fn update(&self, ctx: &Context<'_>, input: AutoUpdateInput) -> Result<UpdatePayload> {
        require_roles(ctx, &[ROLE_ADMIN, ROLE_USER]).map_err(|e| e.extend())?;
        let (id, version, dto) = input.into_parts();
        dto.validate()
            .map_err(|e| AppError::from(e).extend())?;

        let version = format!("\"{}\"", version);
        let version = write_service(ctx)?
            .update(UpdateParams {
                id,
                auto: dto.into(),
                version: &version,
            })
            .await
            .map_err(|e| e.extend())?;
        Ok(UpdatePayload { version })
    }

    async fn delete(&self, ctx: &Context<'_>, id: i32) -> Result<bool> {
        require_roles(ctx, &[ROLE_ADMIN]).map_err(|e| e.extend())?;
        write_service(ctx)?
            .delete(id)
            .await
            .map_err(|e| e.extend())
    }
}
