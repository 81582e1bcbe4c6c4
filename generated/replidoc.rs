#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoWriteReq {
    /// RFC 6902 JSON Patch document.
    #[prost(string, tag = "1")]
    pub payload: ::prost::alloc::string::String,
}
/// Empty. Acceptance only, the patch may still be dropped by the engine.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoWriteResult {}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoReadSnapshotReq {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoSnapshot {
    #[prost(string, tag = "1")]
    pub document: ::prost::alloc::string::String,
}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoReadSequenceTableReq {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoSequenceTable {
    #[prost(map = "string, uint64", tag = "1")]
    pub highest_applied_ids: ::std::collections::HashMap<::prost::alloc::string::String, u64>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoTransaction {
    #[prost(string, tag = "1")]
    pub payload: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub source: ::prost::alloc::string::String,
    #[prost(uint64, tag = "3")]
    pub id: u64,
}
#[doc = r" Generated client implementations."]
pub mod replicated_document_client {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;
    #[doc = " Every node serves the same service. A peer node subscribes exactly like a local viewer,"]
    #[doc = " and additionally streams its own transactions upstream on the same call."]
    pub struct ReplicatedDocumentClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl ReplicatedDocumentClient<tonic::transport::Channel> {
        #[doc = r" Attempt to create a new client by connecting to a given endpoint."]
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: std::convert::TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> ReplicatedDocumentClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::ResponseBody: Body + HttpBody + Send + 'static,
        T::Error: Into<StdError>,
        <T::ResponseBody as HttpBody>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_interceptor(inner: T, interceptor: impl Into<tonic::Interceptor>) -> Self {
            let inner = tonic::client::Grpc::with_interceptor(inner, interceptor);
            Self { inner }
        }
        pub async fn write(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoWriteReq>,
        ) -> Result<tonic::Response<super::ProtoWriteResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/replidoc.ReplicatedDocument/Write");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn read_snapshot(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoReadSnapshotReq>,
        ) -> Result<tonic::Response<super::ProtoSnapshot>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path =
                http::uri::PathAndQuery::from_static("/replidoc.ReplicatedDocument/ReadSnapshot");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn read_sequence_table(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoReadSequenceTableReq>,
        ) -> Result<tonic::Response<super::ProtoSequenceTable>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/replidoc.ReplicatedDocument/ReadSequenceTable",
            );
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn subscribe(
            &mut self,
            request: impl tonic::IntoStreamingRequest<Message = super::ProtoTransaction>,
        ) -> Result<tonic::Response<tonic::codec::Streaming<super::ProtoTransaction>>, tonic::Status>
        {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path =
                http::uri::PathAndQuery::from_static("/replidoc.ReplicatedDocument/Subscribe");
            self.inner
                .streaming(request.into_streaming_request(), path, codec)
                .await
        }
    }
    impl<T: Clone> Clone for ReplicatedDocumentClient<T> {
        fn clone(&self) -> Self {
            Self {
                inner: self.inner.clone(),
            }
        }
    }
    impl<T> std::fmt::Debug for ReplicatedDocumentClient<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "ReplicatedDocumentClient {{ ... }}")
        }
    }
}
#[doc = r" Generated server implementations."]
pub mod replicated_document_server {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;
    #[doc = "Generated trait containing gRPC methods that should be implemented for use with ReplicatedDocumentServer."]
    #[async_trait]
    pub trait ReplicatedDocument: Send + Sync + 'static {
        async fn write(
            &self,
            request: tonic::Request<super::ProtoWriteReq>,
        ) -> Result<tonic::Response<super::ProtoWriteResult>, tonic::Status>;
        async fn read_snapshot(
            &self,
            request: tonic::Request<super::ProtoReadSnapshotReq>,
        ) -> Result<tonic::Response<super::ProtoSnapshot>, tonic::Status>;
        async fn read_sequence_table(
            &self,
            request: tonic::Request<super::ProtoReadSequenceTableReq>,
        ) -> Result<tonic::Response<super::ProtoSequenceTable>, tonic::Status>;
        #[doc = "Server streaming response type for the Subscribe method."]
        type SubscribeStream: futures_core::Stream<Item = Result<super::ProtoTransaction, tonic::Status>>
            + Send
            + Sync
            + 'static;
        async fn subscribe(
            &self,
            request: tonic::Request<tonic::Streaming<super::ProtoTransaction>>,
        ) -> Result<tonic::Response<Self::SubscribeStream>, tonic::Status>;
    }
    #[doc = " Every node serves the same service. A peer node subscribes exactly like a local viewer,"]
    #[doc = " and additionally streams its own transactions upstream on the same call."]
    #[derive(Debug)]
    pub struct ReplicatedDocumentServer<T: ReplicatedDocument> {
        inner: _Inner<T>,
    }
    struct _Inner<T>(Arc<T>, Option<tonic::Interceptor>);
    impl<T: ReplicatedDocument> ReplicatedDocumentServer<T> {
        pub fn new(inner: T) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner, None);
            Self { inner }
        }
        pub fn with_interceptor(inner: T, interceptor: impl Into<tonic::Interceptor>) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner, Some(interceptor.into()));
            Self { inner }
        }
    }
    impl<T, B> Service<http::Request<B>> for ReplicatedDocumentServer<T>
    where
        T: ReplicatedDocument,
        B: HttpBody + Send + Sync + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = Never;
        type Future = BoxFuture<Self::Response, Self::Error>;
        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            let inner = self.inner.clone();
            match req.uri().path() {
                "/replidoc.ReplicatedDocument/Write" => {
                    #[allow(non_camel_case_types)]
                    struct WriteSvc<T: ReplicatedDocument>(pub Arc<T>);
                    impl<T: ReplicatedDocument> tonic::server::UnaryService<super::ProtoWriteReq> for WriteSvc<T> {
                        type Response = super::ProtoWriteResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoWriteReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).write(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = WriteSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/replidoc.ReplicatedDocument/ReadSnapshot" => {
                    #[allow(non_camel_case_types)]
                    struct ReadSnapshotSvc<T: ReplicatedDocument>(pub Arc<T>);
                    impl<T: ReplicatedDocument>
                        tonic::server::UnaryService<super::ProtoReadSnapshotReq>
                        for ReadSnapshotSvc<T>
                    {
                        type Response = super::ProtoSnapshot;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoReadSnapshotReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).read_snapshot(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = ReadSnapshotSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/replidoc.ReplicatedDocument/ReadSequenceTable" => {
                    #[allow(non_camel_case_types)]
                    struct ReadSequenceTableSvc<T: ReplicatedDocument>(pub Arc<T>);
                    impl<T: ReplicatedDocument>
                        tonic::server::UnaryService<super::ProtoReadSequenceTableReq>
                        for ReadSequenceTableSvc<T>
                    {
                        type Response = super::ProtoSequenceTable;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoReadSequenceTableReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).read_sequence_table(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = ReadSequenceTableSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/replidoc.ReplicatedDocument/Subscribe" => {
                    #[allow(non_camel_case_types)]
                    struct SubscribeSvc<T: ReplicatedDocument>(pub Arc<T>);
                    impl<T: ReplicatedDocument>
                        tonic::server::StreamingService<super::ProtoTransaction>
                        for SubscribeSvc<T>
                    {
                        type Response = super::ProtoTransaction;
                        type ResponseStream = T::SubscribeStream;
                        type Future =
                            BoxFuture<tonic::Response<Self::ResponseStream>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<tonic::Streaming<super::ProtoTransaction>>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).subscribe(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1;
                        let inner = inner.0;
                        let method = SubscribeSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.streaming(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                _ => Box::pin(async move {
                    Ok(http::Response::builder()
                        .status(200)
                        .header("grpc-status", "12")
                        .header("content-type", "application/grpc")
                        .body(tonic::body::BoxBody::empty())
                        .unwrap())
                }),
            }
        }
    }
    impl<T: ReplicatedDocument> Clone for ReplicatedDocumentServer<T> {
        fn clone(&self) -> Self {
            let inner = self.inner.clone();
            Self { inner }
        }
    }
    impl<T: ReplicatedDocument> Clone for _Inner<T> {
        fn clone(&self) -> Self {
            Self(self.0.clone(), self.1.clone())
        }
    }
    impl<T: std::fmt::Debug> std::fmt::Debug for _Inner<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }
    impl<T: ReplicatedDocument> tonic::transport::NamedService for ReplicatedDocumentServer<T> {
        const NAME: &'static str = "replidoc.ReplicatedDocument";
    }
}
