use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{NewPoint, Point, PointPatch};
use crate::utils::errors::AppError;

// Nunca incluye estado / legacy_id / tipo_punto
const POINT_COLUMNS: &str = "id, nombre_punto, encargado, administrador, direccion_completa, \
    tipo_via, nombre_via, comuna_id, comuna_nombre, region_id, region_nombre, region_abreviatura, \
    latitud, longitud, telefono, horario, tipo_electronico, materiales_aceptados, created_at, updated_at";

/// Cantidad de filas que aún tienen campos heredados
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct LegacyFieldCounts {
    pub with_estado: i64,
    pub with_legacy_id: i64,
    pub with_tipo_punto: i64,
}

/// Acceso a almacenamiento de puntos de reciclaje
#[async_trait]
pub trait PointRepository: Send + Sync {
    /// Inserta el documento y devuelve el id generado por la base de datos
    async fn create(&self, point: NewPoint) -> Result<Uuid, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Point>, AppError>;

    /// Lista ordenada por creación, filtrando por región si se indica
    async fn list(&self, region: Option<&str>) -> Result<Vec<Point>, AppError>;

    /// Aplica el parche de forma atómica y limpia `tipo_electronico`.
    /// `None` si no existe el punto.
    async fn update(&self, id: Uuid, patch: PointPatch) -> Result<Option<Point>, AppError>;

    /// `false` si no existe el punto
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    async fn count_legacy_fields(&self) -> Result<LegacyFieldCounts, AppError>;

    /// Borra estado / legacy_id / tipo_punto; devuelve filas tocadas
    async fn purge_legacy_fields(&self) -> Result<u64, AppError>;
}

pub struct PgPointRepository {
    pool: PgPool,
}

impl PgPointRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PointRepository for PgPointRepository {
    async fn create(&self, point: NewPoint) -> Result<Uuid, AppError> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO puntos (
                nombre_punto, encargado, administrador, direccion_completa, tipo_via, nombre_via,
                comuna_id, comuna_nombre, region_id, region_nombre, region_abreviatura,
                latitud, longitud, telefono, horario, materiales_aceptados
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING id
            "#,
        )
        .bind(point.nombre_punto)
        .bind(point.encargado)
        .bind(point.administrador)
        .bind(point.direccion_completa)
        .bind(point.tipo_via)
        .bind(point.nombre_via)
        .bind(point.comuna_id)
        .bind(point.comuna_nombre)
        .bind(point.region_id)
        .bind(point.region_nombre)
        .bind(point.region_abreviatura)
        .bind(point.latitud)
        .bind(point.longitud)
        .bind(point.telefono)
        .bind(point.horario)
        .bind(point.materiales_aceptados)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Point>, AppError> {
        let query = format!("SELECT {} FROM puntos WHERE id = $1", POINT_COLUMNS);
        let point = sqlx::query_as::<_, Point>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(point)
    }

    async fn list(&self, region: Option<&str>) -> Result<Vec<Point>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM puntos", POINT_COLUMNS));

        if let Some(region) = region.map(str::trim).filter(|r| !r.is_empty()) {
            builder
                .push(" WHERE region_nombre ILIKE ")
                .push_bind(format!("%{}%", escape_like(region)))
                .push(" ESCAPE '\\'");
        }
        builder.push(" ORDER BY created_at ASC");

        let points = builder
            .build_query_as::<Point>()
            .fetch_all(&self.pool)
            .await?;

        Ok(points)
    }

    async fn update(&self, id: Uuid, patch: PointPatch) -> Result<Option<Point>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE puntos SET tipo_electronico = NULL, updated_at = NOW()");

        if let Some(v) = patch.nombre_punto {
            builder.push(", nombre_punto = ").push_bind(v);
        }
        if let Some(v) = patch.encargado {
            builder.push(", encargado = ").push_bind(v);
        }
        if let Some(v) = patch.administrador {
            builder.push(", administrador = ").push_bind(v);
        }
        if let Some(v) = patch.telefono {
            builder.push(", telefono = ").push_bind(v);
        }
        if let Some(v) = patch.horario {
            builder.push(", horario = ").push_bind(v);
        }
        if let Some(v) = patch.direccion_completa {
            builder.push(", direccion_completa = ").push_bind(v);
        }
        if let Some(v) = patch.tipo_via {
            builder.push(", tipo_via = ").push_bind(v);
        }
        if let Some(v) = patch.nombre_via {
            builder.push(", nombre_via = ").push_bind(v);
        }
        if let Some(v) = patch.comuna_id {
            builder.push(", comuna_id = ").push_bind(v);
        }
        if let Some(v) = patch.comuna_nombre {
            builder.push(", comuna_nombre = ").push_bind(v);
        }
        if let Some(v) = patch.region_id {
            builder.push(", region_id = ").push_bind(v);
        }
        if let Some(v) = patch.region_nombre {
            builder.push(", region_nombre = ").push_bind(v);
        }
        if let Some(v) = patch.region_abreviatura {
            builder.push(", region_abreviatura = ").push_bind(v);
        }
        if let Some(v) = patch.latitud {
            builder.push(", latitud = ").push_bind(v);
        }
        if let Some(v) = patch.longitud {
            builder.push(", longitud = ").push_bind(v);
        }
        if let Some(v) = patch.materiales_aceptados {
            builder.push(", materiales_aceptados = ").push_bind(v);
        }

        builder.push(" WHERE id = ").push_bind(id);
        builder.push(format!(" RETURNING {}", POINT_COLUMNS));

        let point = builder
            .build_query_as::<Point>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(point)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM puntos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_legacy_fields(&self) -> Result<LegacyFieldCounts, AppError> {
        let counts = sqlx::query_as::<_, LegacyFieldCounts>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE estado IS NOT NULL) AS with_estado,
                COUNT(*) FILTER (WHERE legacy_id IS NOT NULL) AS with_legacy_id,
                COUNT(*) FILTER (WHERE tipo_punto IS NOT NULL) AS with_tipo_punto
            FROM puntos
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }

    async fn purge_legacy_fields(&self) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE puntos
            SET estado = NULL, legacy_id = NULL, tipo_punto = NULL
            WHERE estado IS NOT NULL OR legacy_id IS NOT NULL OR tipo_punto IS NOT NULL
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Escapa los comodines de LIKE para que el filtro sea una subcadena literal
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("Biobío"), "Biobío");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("los_rios"), "los\\_rios");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
