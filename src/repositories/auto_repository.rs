use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::auto::{Auto, AutoRow, AutoUpdate, Ausstattung, NewAuto};
use crate::models::auto_file::{AutoFile, AutoFileMeta, NewAutoFile};
use crate::services::query_builder::{AutoFilter, AutoPredicate};
use crate::utils::errors::AppError;

/// Acceso al store de autos. Cada método es una llamada al store; los
/// servicios no conocen SQL.
#[async_trait]
pub trait AutoStore: Send + Sync {
    async fn find_by_id(&self, id: i32, mit_ausstattungen: bool) -> Result<Option<Auto>, AppError>;

    /// Autos que cumplen el filtro en la ventana offset/limit, junto con el
    /// total sin paginar
    async fn find(
        &self,
        filter: &AutoFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Auto>, i64), AppError>;

    /// Todos los autos que cumplen el filtro, ordenados por id
    async fn find_all(&self, filter: &AutoFilter) -> Result<Vec<Auto>, AppError>;

    async fn count(&self) -> Result<i64, AppError>;

    async fn count_by_fin(&self, fin: &str) -> Result<i64, AppError>;

    /// Inserta auto, Zulassung y Ausstattungen en una transacción
    async fn insert(&self, auto: &NewAuto) -> Result<i32, AppError>;

    /// Escritura condicional: solo si la versión almacenada sigue siendo
    /// `expected_version`. Devuelve la nueva versión o `None` si otra
    /// escritura se adelantó.
    async fn update(
        &self,
        id: i32,
        auto: &AutoUpdate,
        expected_version: i32,
    ) -> Result<Option<i32>, AppError>;

    async fn delete(&self, id: i32) -> Result<bool, AppError>;

    async fn find_file(&self, auto_id: i32) -> Result<Option<AutoFile>, AppError>;

    /// Borra el archivo anterior (si lo hay) y guarda el nuevo
    async fn replace_file(&self, auto_id: i32, file: NewAutoFile) -> Result<AutoFileMeta, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}

const SELECT_AUTO: &str = r#"
    SELECT a.id, a.version, a.fin, a.rating, a.art, a.preis, a.rabatt, a.verfuegbar,
           a.baujahr, a.homepage, a.schlagwoerter, a.erzeugt, a.aktualisiert,
           z.identifikations_nummer, z.erstzulassung, z.gueltig_bis
    FROM auto a
    LEFT JOIN zulassung z ON z.auto_id = a.id
"#;

/// `%`, `_` y `\` del valor se buscan literalmente en un LIKE con `ESCAPE '\'`
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Añade `WHERE ...` con un predicado por condición del filtro
pub fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &AutoFilter) {
    for (index, predicate) in filter.predicates.iter().enumerate() {
        builder.push(if index == 0 { " WHERE " } else { " AND " });

        match predicate {
            AutoPredicate::IdentifikationsNummerContains(value) => {
                builder
                    .push("z.identifikations_nummer ILIKE ")
                    .push_bind(format!("%{}%", escape_like(value)))
                    .push(" ESCAPE '\\'");
            }
            AutoPredicate::FinEquals(value) => {
                builder.push("a.fin = ").push_bind(value.clone());
            }
            AutoPredicate::RatingAtLeast(rating) => {
                builder.push("a.rating >= ").push_bind(*rating);
            }
            AutoPredicate::PreisAtMost(preis) => {
                builder.push("a.preis <= ").push_bind(*preis);
            }
            AutoPredicate::ArtEquals(art) => {
                builder.push("a.art = ").push_bind(*art);
            }
            AutoPredicate::VerfuegbarEquals(verfuegbar) => {
                builder.push("a.verfuegbar = ").push_bind(*verfuegbar);
            }
            AutoPredicate::BaujahrFrom(baujahr) => {
                builder.push("a.baujahr >= ").push_bind(*baujahr);
            }
            AutoPredicate::HomepageEquals(value) => {
                builder.push("a.homepage = ").push_bind(value.clone());
            }
            AutoPredicate::SchlagwoerterContainAll(schlagwoerter) => {
                builder
                    .push("a.schlagwoerter @> ")
                    .push_bind(schlagwoerter.clone())
                    .push("::text[]");
            }
        }
    }
}

/// Implementación PostgreSQL de `AutoStore`
#[derive(Clone)]
pub struct PgAutoRepository {
    pool: PgPool,
}

impl PgAutoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_ausstattungen(&self, auto_id: i32) -> Result<Vec<Ausstattung>, AppError> {
        let ausstattungen = sqlx::query_as::<_, Ausstattung>(
            "SELECT bezeichnung, beschreibung, preis FROM ausstattung WHERE auto_id = $1 ORDER BY id",
        )
        .bind(auto_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ausstattungen)
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[async_trait]
impl AutoStore for PgAutoRepository {
    async fn find_by_id(&self, id: i32, mit_ausstattungen: bool) -> Result<Option<Auto>, AppError> {
        let row = sqlx::query_as::<_, AutoRow>(&format!("{} WHERE a.id = $1", SELECT_AUTO))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut auto = Auto::from(row);
        if mit_ausstattungen {
            auto.ausstattungen = Some(self.load_ausstattungen(id).await?);
        }
        Ok(Some(auto))
    }

    async fn find(
        &self,
        filter: &AutoFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Auto>, i64), AppError> {
        let mut select = QueryBuilder::<Postgres>::new(SELECT_AUTO);
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY a.id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = select
            .build_query_as::<AutoRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM auto a LEFT JOIN zulassung z ON z.auto_id = a.id",
        );
        push_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        Ok((rows.into_iter().map(Auto::from).collect(), total))
    }

    async fn find_all(&self, filter: &AutoFilter) -> Result<Vec<Auto>, AppError> {
        let mut select = QueryBuilder::<Postgres>::new(SELECT_AUTO);
        push_filter(&mut select, filter);
        select.push(" ORDER BY a.id");

        let rows = select
            .build_query_as::<AutoRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Auto::from).collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM auto")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_by_fin(&self, fin: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM auto WHERE fin = $1")
            .bind(fin)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert(&self, auto: &NewAuto) -> Result<i32, AppError> {
        let mut tx = self.pool.begin().await?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO auto (version, fin, rating, art, preis, rabatt, verfuegbar, baujahr, homepage, schlagwoerter, erzeugt, aktualisiert)
            VALUES (0, $1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW())
            RETURNING id
            "#,
        )
        .bind(&auto.fin)
        .bind(auto.rating)
        .bind(auto.art)
        .bind(auto.preis)
        .bind(auto.rabatt)
        .bind(auto.verfuegbar)
        .bind(auto.baujahr)
        .bind(&auto.homepage)
        .bind(&auto.schlagwoerter)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::FinExists(auto.fin.clone())
            } else {
                AppError::Database(e)
            }
        })?;

        sqlx::query(
            "INSERT INTO zulassung (identifikations_nummer, erstzulassung, gueltig_bis, auto_id) VALUES ($1, $2, $3, $4)",
        )
        .bind(&auto.zulassung.identifikations_nummer)
        .bind(auto.zulassung.erstzulassung)
        .bind(auto.zulassung.gueltig_bis)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        for ausstattung in &auto.ausstattungen {
            sqlx::query(
                "INSERT INTO ausstattung (bezeichnung, beschreibung, preis, auto_id) VALUES ($1, $2, $3, $4)",
            )
            .bind(&ausstattung.bezeichnung)
            .bind(&ausstattung.beschreibung)
            .bind(ausstattung.preis)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    async fn update(
        &self,
        id: i32,
        auto: &AutoUpdate,
        expected_version: i32,
    ) -> Result<Option<i32>, AppError> {
        let version: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE auto
            SET version = version + 1, fin = $3, rating = $4, art = $5, preis = $6, rabatt = $7,
                verfuegbar = $8, baujahr = $9, homepage = $10, schlagwoerter = $11, aktualisiert = NOW()
            WHERE id = $1 AND version = $2
            RETURNING version
            "#,
        )
        .bind(id)
        .bind(expected_version)
        .bind(&auto.fin)
        .bind(auto.rating)
        .bind(auto.art)
        .bind(auto.preis)
        .bind(auto.rabatt)
        .bind(auto.verfuegbar)
        .bind(auto.baujahr)
        .bind(&auto.homepage)
        .bind(&auto.schlagwoerter)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::FinExists(auto.fin.clone())
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(version)
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM auto WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_file(&self, auto_id: i32) -> Result<Option<AutoFile>, AppError> {
        let file = sqlx::query_as::<_, AutoFile>(
            "SELECT id, auto_id, filename, mimetype, data FROM auto_file WHERE auto_id = $1",
        )
        .bind(auto_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn replace_file(&self, auto_id: i32, file: NewAutoFile) -> Result<AutoFileMeta, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM auto_file WHERE auto_id = $1")
            .bind(auto_id)
            .execute(&mut *tx)
            .await?;

        let meta = sqlx::query_as::<_, AutoFileMeta>(
            r#"
            INSERT INTO auto_file (filename, mimetype, data, auto_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, auto_id, filename, mimetype, octet_length(data)::BIGINT AS size
            "#,
        )
        .bind(file.filename)
        .bind(file.mimetype)
        .bind(file.data)
        .bind(auto_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(meta)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
