//! Display languages and user-facing messages
//!
//! Messages are addressed by [`MessageKey`]; each locale maps every key to
//! its own text, so editing the English wording never breaks a lookup.

use std::fmt;

/// Supported display languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    De,
}

impl Locale {
    /// Parse a language code, `None` for unsupported codes
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Locale::En),
            "de" => Some(Locale::De),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::De => "de",
        }
    }

    pub fn all() -> &'static [Locale] {
        &[Locale::En, Locale::De]
    }

    /// Resolve the locale of a request
    ///
    /// Order: explicit `lang` query value, then the first entry of the
    /// `Accept-Language` header whose two-letter prefix is supported, then English.
    /// An unsupported `lang` value selects English without consulting the header.
    pub fn resolve(query: Option<&str>, accept_language: Option<&str>) -> Self {
        if let Some(code) = query {
            return Self::from_code(code).unwrap_or_default();
        }

        accept_language
            .into_iter()
            .flat_map(|header| header.split(','))
            .filter_map(|entry| entry.trim().get(..2))
            .find_map(Self::from_code)
            .unwrap_or_default()
    }

    pub fn text(&self, key: MessageKey) -> &'static str {
        match self {
            Locale::En => english(key),
            Locale::De => german(key),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Every user-facing message of the installer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    Title,
    Introduction,
    DirectoryPrompt,
    MissingCapabilities,
    WorkingDirectoryNotWritable,
    TargetDirectoryNotWritable,
    DirectoryNotEmpty,
    EmptyDirectoryInput,
    DirectoryOutsideRoot,
    UrlResolutionFailed,
    DownloadFailed,
    ExtractionFailed,
    Downloading,
    WindowsUnsupported,
    Succeeded,
    SelfDeleteFailed,
    InstallNow,
    Back,
    InvalidStep,
    ContinueToInstallation,
    DocumentRootHint,
    ContinuationHint,
}

impl MessageKey {
    pub const ALL: [MessageKey; 22] = [
        MessageKey::Title,
        MessageKey::Introduction,
        MessageKey::DirectoryPrompt,
        MessageKey::MissingCapabilities,
        MessageKey::WorkingDirectoryNotWritable,
        MessageKey::TargetDirectoryNotWritable,
        MessageKey::DirectoryNotEmpty,
        MessageKey::EmptyDirectoryInput,
        MessageKey::DirectoryOutsideRoot,
        MessageKey::UrlResolutionFailed,
        MessageKey::DownloadFailed,
        MessageKey::ExtractionFailed,
        MessageKey::Downloading,
        MessageKey::WindowsUnsupported,
        MessageKey::Succeeded,
        MessageKey::SelfDeleteFailed,
        MessageKey::InstallNow,
        MessageKey::Back,
        MessageKey::InvalidStep,
        MessageKey::ContinueToInstallation,
        MessageKey::DocumentRootHint,
        MessageKey::ContinuationHint,
    ];
}

fn english(key: MessageKey) -> &'static str {
    match key {
        MessageKey::Title => "Limbas Web Installer",
        MessageKey::Introduction => "The Limbas Web Installer downloads the latest version of Limbas into the specified directory. The installation can then begin.",
        MessageKey::DirectoryPrompt => "Enter a single \".\" to install in the current directory, or enter a subdirectory to install to:",
        MessageKey::MissingCapabilities => "The following capabilities are required to use the Limbas web installer:",
        MessageKey::WorkingDirectoryNotWritable => "Can't write to the current directory. Please fix this by giving the webserver user write access to the directory.",
        MessageKey::TargetDirectoryNotWritable => "Can't write to the target directory. Please fix this by giving the webserver user write access to the directory.",
        MessageKey::DirectoryNotEmpty => "The selected directory is not empty. Please select an empty directory.",
        MessageKey::EmptyDirectoryInput => "Please enter a directory.",
        MessageKey::DirectoryOutsideRoot => "The selected directory must be inside the current directory.",
        MessageKey::UrlResolutionFailed => "The URL of the latest version could not be retrieved from GitHub.",
        MessageKey::DownloadFailed => "Source file could not be downloaded.",
        MessageKey::ExtractionFailed => "Extraction of the source file failed",
        MessageKey::Downloading => "Limbas is being downloaded...",
        MessageKey::WindowsUnsupported => "Please note that Limbas is not officially supported under Windows and may not work completely.",
        MessageKey::Succeeded => "Limbas was successfully downloaded.",
        MessageKey::SelfDeleteFailed => "Failed to remove installer script. Please remove it manually.",
        MessageKey::InstallNow => "Install now",
        MessageKey::Back => "Back",
        MessageKey::InvalidStep => "An error has occurred. Please try again.",
        MessageKey::ContinueToInstallation => "Continue to the installation",
        MessageKey::DocumentRootHint => "Make sure your domain points to the following directory:",
        MessageKey::ContinuationHint => "The installer has stopped. Once your web server serves the directory above, open the following link to continue:",
    }
}

fn german(key: MessageKey) -> &'static str {
    match key {
        MessageKey::Title => "Limbas Web Installer",
        MessageKey::Introduction => "Der Limbas Web Installer lädt die neuste Version von Limbas in das angegebene Verzeichnis. Anschließend kann mit der Installation begonnen werden.",
        MessageKey::DirectoryPrompt => "Geben Sie einen einzelnen \".\" ein, um im aktuellen Verzeichnis zu installieren, oder geben Sie ein Unterverzeichnis ein, in das installiert werden soll:",
        MessageKey::MissingCapabilities => "Die folgenden Funktionen sind erforderlich, um den Limbas Web Installer zu verwenden:",
        MessageKey::WorkingDirectoryNotWritable => "Das aktuelle Verzeichnis ist nicht beschreibbar. Bitte beheben Sie dies, indem Sie dem Webserver-Benutzer Zugriff auf das Verzeichnis ermöglichen.",
        MessageKey::TargetDirectoryNotWritable => "Das Zielverzeichnis ist nicht beschreibbar. Bitte beheben Sie dies, indem Sie dem Webserver-Benutzer Zugriff auf das Verzeichnis ermöglichen.",
        MessageKey::DirectoryNotEmpty => "Das ausgewählte Verzeichnis ist nicht leer. Bitte leeres Verzeichnis auswählen.",
        MessageKey::EmptyDirectoryInput => "Bitte Verzeichnis eintragen.",
        MessageKey::DirectoryOutsideRoot => "Das ausgewählte Verzeichnis muss innerhalb des aktuellen Verzeichnisses liegen.",
        MessageKey::UrlResolutionFailed => "Die URL der neuesten Version konnte nicht von GitHub abgerufen werden.",
        MessageKey::DownloadFailed => "Quelldatei konnte nicht heruntergeladen werden.",
        MessageKey::ExtractionFailed => "Das Entpacken des Archivs ist fehlgeschlagen",
        MessageKey::Downloading => "Limbas wird heruntergeladen..",
        MessageKey::WindowsUnsupported => "Bitte beachten Sie, dass Limbas unter Windows nicht offiziell unterstützt wird und unter Umständen nicht vollständig funktioniert.",
        MessageKey::Succeeded => "Limbas wurde erfolgreich heruntergeladen.",
        MessageKey::SelfDeleteFailed => "Das Installationsskript konnte nicht gelöscht werden. Bitte manuell entfernen.",
        MessageKey::InstallNow => "Jetzt installieren",
        MessageKey::Back => "Zurück",
        MessageKey::InvalidStep => "Ein Fehler ist aufgetreten. Bitte erneut versuchen.",
        MessageKey::ContinueToInstallation => "Weiter zur Installation",
        MessageKey::DocumentRootHint => "Stellen Sie sicher, dass Ihre Domain auf das nachfolgende Verzeichnis zeigt:",
        MessageKey::ContinuationHint => "Der Installer wurde beendet. Sobald Ihr Webserver das obige Verzeichnis ausliefert, öffnen Sie den folgenden Link, um fortzufahren:",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_parameter_wins() {
        assert_eq!(Locale::resolve(Some("de"), Some("en-US,en")), Locale::De);
        assert_eq!(Locale::resolve(Some("en"), Some("de-DE")), Locale::En);
    }

    #[test]
    fn test_unsupported_query_falls_back_to_english() {
        assert_eq!(Locale::resolve(Some("fr"), Some("de-DE")), Locale::En);
    }

    #[test]
    fn test_accept_language_first_supported_entry() {
        assert_eq!(Locale::resolve(None, Some("fr-FR,de-DE;q=0.8,en;q=0.5")), Locale::De);
        assert_eq!(Locale::resolve(None, Some("fr-FR, ja")), Locale::En);
        assert_eq!(Locale::resolve(None, Some("d")), Locale::En);
        assert_eq!(Locale::resolve(None, None), Locale::En);
    }

    #[test]
    fn test_every_key_translated() {
        let unique: std::collections::HashSet<_> = MessageKey::ALL.iter().collect();
        assert_eq!(unique.len(), MessageKey::ALL.len());

        for key in MessageKey::ALL {
            for locale in Locale::all() {
                assert!(!locale.text(key).is_empty(), "{:?} in {}", key, locale);
            }
            // The product name is the only text shared between languages
            if key != MessageKey::Title {
                assert_ne!(Locale::En.text(key), Locale::De.text(key), "{:?}", key);
            }
        }
    }
}
