use crate::config::Locale;

/// User-facing strings for one locale.
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    pub no_folders: &'static str,
    pub all_recordings: &'static str,
    pub new_folder_title: &'static str,
    pub rename_folder_title: &'static str,
    pub delete_title: &'static str,
    delete_prompt: &'static str,
    pub folder_created: &'static str,
    pub folder_renamed: &'static str,
    pub folder_deleted: &'static str,
    pub load_failed: &'static str,
    pub create_failed: &'static str,
    pub rename_failed: &'static str,
    pub delete_failed: &'static str,
    pub busy: &'static str,
    pub delete_cancelled: &'static str,
}

const EN: Messages = Messages {
    no_folders: "No folders yet",
    all_recordings: "All recordings",
    new_folder_title: "New folder",
    rename_folder_title: "Rename folder",
    delete_title: "Delete folder",
    delete_prompt: "Delete \"{name}\"? Recordings inside will be moved to the parent folder.",
    folder_created: "Folder created",
    folder_renamed: "Folder renamed",
    folder_deleted: "Folder deleted",
    load_failed: "Could not load folders",
    create_failed: "Could not create folder",
    rename_failed: "Could not rename folder",
    delete_failed: "Could not delete folder",
    busy: "This folder is still being updated",
    delete_cancelled: "Delete cancelled",
};

const ES: Messages = Messages {
    no_folders: "Todavía no hay carpetas",
    all_recordings: "Todas las grabaciones",
    new_folder_title: "Nueva carpeta",
    rename_folder_title: "Renombrar carpeta",
    delete_title: "Eliminar carpeta",
    delete_prompt: "¿Eliminar \"{name}\"? Las grabaciones se moverán a la carpeta superior.",
    folder_created: "Carpeta creada",
    folder_renamed: "Carpeta renombrada",
    folder_deleted: "Carpeta eliminada",
    load_failed: "No se pudieron cargar las carpetas",
    create_failed: "No se pudo crear la carpeta",
    rename_failed: "No se pudo renombrar la carpeta",
    delete_failed: "No se pudo eliminar la carpeta",
    busy: "Esta carpeta todavía se está actualizando",
    delete_cancelled: "Eliminación cancelada",
};

impl Messages {
    pub fn for_locale(locale: Locale) -> &'static Messages {
        match locale {
            Locale::En => &EN,
            Locale::Es => &ES,
        }
    }

    pub fn delete_confirmation(&self, name: &str) -> String {
        self.delete_prompt.replace("{name}", name)
    }
}
