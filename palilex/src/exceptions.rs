//! 例外ストア
//!
//! このモジュールは、自動グループ化から除外する語義キーの永続化された
//! 否定リストを提供します。プロセス開始時に一括で読み込まれ、追加の
//! たびにファイル全体が原子的に書き換えられます。

use std::fs::File;
use std::io::{BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use hashbrown::HashSet;
use tempfile::NamedTempFile;

use crate::common;
use crate::errors::Result;

/// 語義キーの永続化された否定リスト
///
/// メンバーシップ判定は、`"pos:meaning"`または`"pos:meaning1:meaning2"`
/// 形式にシリアライズされたキーとの文字列等価比較です。ディスク書き込みが
/// 失敗しても、メモリ上のエントリは保持されます。同一の判断を同一実行内で
/// 再度尋ねないためです。
pub struct ExceptionStore {
    path: Option<PathBuf>,
    entries: Vec<String>,
    lookup: HashSet<String>,
}

impl ExceptionStore {
    /// ディスクに永続化しないメモリ上のみのストアを作成します。
    ///
    /// 主にテストで使用します。
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: vec![],
            lookup: HashSet::new(),
        }
    }

    /// 例外ファイルを読み込みます。
    ///
    /// ファイルが存在しない場合は空のストアを返します（初回実行）。
    ///
    /// # 引数
    ///
    /// * `path` - 例外ファイルのパス
    ///
    /// # エラー
    ///
    /// ファイルは存在するが読み込みまたはデコードに失敗した場合に
    /// エラーを返します。
    pub fn load<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let entries: Vec<String> = match File::open(path) {
            Ok(file) => {
                let mut rdr = BufReader::new(file);
                bincode::decode_from_std_read(&mut rdr, common::bincode_config())?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => vec![],
            Err(e) => return Err(e.into()),
        };
        let lookup = entries.iter().cloned().collect();
        Ok(Self {
            path: Some(path.to_path_buf()),
            entries,
            lookup,
        })
    }

    /// キーが否定リストに含まれるかを判定します。
    pub fn contains(&self, key: &str) -> bool {
        self.lookup.contains(key)
    }

    /// キーを否定リストに追加し、ただちに永続化します。
    ///
    /// メモリ上の追加は永続化の成否にかかわらず保持されます。既に含まれる
    /// キーの追加は何もしません。
    ///
    /// # 引数
    ///
    /// * `key` - シリアライズされた語義キー
    ///
    /// # エラー
    ///
    /// ディスクへの書き込みに失敗した場合にエラーを返します。この場合も
    /// メモリ上のストアは更新済みです。
    pub fn add(&mut self, key: String) -> Result<()> {
        if self.lookup.contains(&key) {
            return Ok(());
        }
        self.entries.push(key.clone());
        self.lookup.insert(key);
        self.persist()
    }

    /// ストア全体をディスクに書き出します。
    ///
    /// 一時ファイルに書いてから置き換えることで、書き込み途中のクラッシュで
    /// ファイルが壊れないことを保証します。メモリ上のみのストアでは何も
    /// しません。
    ///
    /// # エラー
    ///
    /// 一時ファイルの作成、書き込み、または置き換えに失敗した場合に
    /// エラーを返します。
    pub fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let mut tmp = match dir {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new_in(".")?,
        };
        bincode::encode_into_std_write(&self.entries, &mut tmp, common::bincode_config())?;
        tmp.flush()?;
        tmp.persist(path)?;
        Ok(())
    }

    /// エントリ数を返します。
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// ストアが空かどうかを返します。
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// エントリを追加順で返します。
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}
