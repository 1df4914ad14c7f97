use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PMORadio API",
        version = "0.1.0",
        description = "API REST de la station radio : flux audio, statut, playlist",
    ),
    paths(
        crate::api::stream_audio,
        crate::api::get_status,
        crate::api::next_track,
        crate::api::reload_playlist,
    ),
    components(
        schemas(
            crate::station::StationStatus,
            crate::api::ReloadResponse,
        )
    ),
    tags(
        (name = "radio", description = "Flux audio et statut de la station"),
        (name = "playlist", description = "Mutations de la rotation")
    )
)]
pub struct ApiDoc;
