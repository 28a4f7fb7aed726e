use super::nodes::rrd_params;
use super::{PveClient, require_non_blank, require_vmid, to_body};
use crate::error::Error;
use crate::models::{
    BackupCreateRequest, BrowseEntry, RrdDataPoint, Storage, StorageContent, Timeframe, Upid,
};

impl PveClient {
    /// `GET /nodes/{node}/storage`
    pub async fn storages(&self, node: &str) -> Result<Vec<Storage>, Error> {
        let node = require_non_blank("node", node)?;
        self.get_list(self.endpoint(&["nodes", node, "storage"]), &[])
            .await
    }

    /// Volumes on a storage (disk images, ISOs, templates, backups).
    ///
    /// `GET /nodes/{node}/storage/{storage}/content`
    pub async fn storage_content(
        &self,
        node: &str,
        storage: &str,
    ) -> Result<Vec<StorageContent>, Error> {
        let node = require_non_blank("node", node)?;
        let storage = require_non_blank("storage", storage)?;
        self.get_list(
            self.endpoint(&["nodes", node, "storage", storage, "content"]),
            &[],
        )
        .await
    }

    /// `GET /nodes/{node}/storage/{storage}/rrddata`
    pub async fn storage_rrd(
        &self,
        node: &str,
        storage: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<RrdDataPoint>, Error> {
        let node = require_non_blank("node", node)?;
        let storage = require_non_blank("storage", storage)?;
        self.get_list(
            self.endpoint(&["nodes", node, "storage", storage, "rrddata"]),
            &rrd_params(timeframe),
        )
        .await
    }

    /// List a directory on a file-level storage. `path` defaults to `/`.
    ///
    /// `GET /nodes/{node}/storage/{storage}/browse?path=...`
    pub async fn browse_storage(
        &self,
        node: &str,
        storage: &str,
        path: Option<&str>,
    ) -> Result<Vec<BrowseEntry>, Error> {
        let node = require_non_blank("node", node)?;
        let storage = require_non_blank("storage", storage)?;
        let path = path.map(str::trim).filter(|p| !p.is_empty()).unwrap_or("/");
        self.get_list(
            self.endpoint(&["nodes", node, "storage", storage, "browse"]),
            &[("path", path.to_owned())],
        )
        .await
    }

    /// Start a vzdump backup of one VM.
    ///
    /// `POST /nodes/{node}/qemu/{vmid}/backup`
    pub async fn create_backup(
        &self,
        node: &str,
        vmid: u32,
        request: &BackupCreateRequest,
    ) -> Result<Upid, Error> {
        let node = require_non_blank("node", node)?;
        let id = require_vmid(vmid)?;
        require_non_blank("storage", &request.storage)?;
        let body = to_body("request", request)?;
        self.post_task(
            self.endpoint(&["nodes", node, "qemu", &id, "backup"]),
            Some(&body),
        )
        .await
    }

    /// Delete a volume (backup archive, ISO, disk image).
    ///
    /// Some storage types delete synchronously and return no task, hence the
    /// `Option`.
    ///
    /// `DELETE /nodes/{node}/storage/{storage}/content/{volume}`
    pub async fn delete_volume(
        &self,
        node: &str,
        storage: &str,
        volume: &str,
    ) -> Result<Option<Upid>, Error> {
        let node = require_non_blank("node", node)?;
        let storage = require_non_blank("storage", storage)?;
        let volume = require_non_blank("volume", volume)?;
        self.delete_optional(self.endpoint(&["nodes", node, "storage", storage, "content", volume]))
            .await
    }
}
